//! Instruction text sent to the completion backend
//!
//! Prompts are in Indonesian, matching the users. Everything the model
//! needs (subject vocabulary, the user's offset, the current time and the
//! exact reply shape) is embedded, since the backend keeps no state.

use crate::core::calendar::{format_offset, ReferenceTime};
use crate::interpret::subjects::SubjectTable;

/// Quote user text as a JSON string so embedded quotes cannot break the prompt
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Instruction asking for one JSON object describing the task
pub fn task_extraction_prompt(text: &str, reference: &ReferenceTime, subjects: &SubjectTable) -> String {
    let vocabulary = subjects
        .entries()
        .map(|e| format!("- {}: {}", e.key, e.name))
        .collect::<Vec<_>>()
        .join("\n");
    let offset_hours = reference.utc_offset_hours();

    format!(
        r#"Ubah kalimat tugas mahasiswa berikut menjadi data terstruktur.

Daftar mata kuliah (singkatan: nama lengkap):
{vocabulary}
Jika tidak ada mata kuliah yang cocok, buat label subjek singkat sendiri atau gunakan "{fallback}".

Zona waktu pengguna: {offset} (selisih {offset_hours} jam dari UTC).
Waktu sekarang: {now} ({now_iso}).
Hitung tanggal relatif seperti "besok", "lusa", atau "minggu depan" dari waktu sekarang.

Balas dengan TEPAT SATU objek JSON, tanpa teks lain, dengan field:
- "taskName": nama tugas yang bersih, tanpa kata tanggal, jam, mata kuliah, atau kata "deadline"
- "subject": nama lengkap mata kuliah
- "deadlineISO": tenggat dalam format ISO 8601 dengan offset zona waktu pengguna, atau null jika tidak disebut
- "priority": salah satu dari "Critical", "Important", "Routine"
- "tags": array berisi 0 sampai 3 kata kunci pendek

Contoh Input: "tugas imk besok jam 10 malam"
Contoh Output: {{"taskName": "Tugas", "subject": "Interaksi Manusia Komputer", "deadlineISO": "2024-01-02T22:00:00+07:00", "priority": "Important", "tags": ["tugas"]}}

Input: {input}
Output:"#,
        vocabulary = vocabulary,
        fallback = subjects.fallback(),
        offset = format_offset(offset_hours),
        offset_hours = offset_hours,
        now = reference.describe(),
        now_iso = reference.instant().to_rfc3339(),
        input = quoted(text),
    )
}

/// Instruction asking for a JSON array of 3 to 5 subtasks
pub fn subtask_prompt(task_name: &str, description: Option<&str>) -> String {
    let context = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("\nDengan deskripsi tambahan: {}", quoted(d)),
        None => String::new(),
    };

    format!(
        r#"Berdasarkan tugas utama ini: {task}{context}
Pecah menjadi 3 sampai 5 sub-tugas yang logis, singkat, dan bisa langsung dikerjakan.
Balas hanya dengan JSON array of strings.
Contoh Input: "Buat presentasi IMK"
Contoh Output: ["Riset topik", "Buat outline", "Desain slide", "Latihan presentasi"]
Input: {task}
Output:"#,
        task = quoted(task_name),
        context = context,
    )
}

/// Instruction asking for short plain-text study notes on one task
pub fn deep_dive_prompt(task_name: &str, subject: &str, description: Option<&str>) -> String {
    let context = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("\nDeskripsi dari mahasiswa: {}", quoted(d)),
        None => String::new(),
    };

    format!(
        r#"Kamu membantu mahasiswa memahami tugas kuliahnya.
Tugas: {task}
Mata kuliah: {subject}{context}

Jelaskan secara singkat (paling banyak 200 kata, teks biasa tanpa markdown):
1. Apa inti tugas ini dan konsep yang perlu dikuasai.
2. Urutan pengerjaan yang disarankan.
3. Kesalahan umum yang perlu dihindari.
4. Satu atau dua kata kunci untuk mencari referensi."#,
        task = quoted(task_name),
        subject = subject,
        context = context,
    )
}
