use anyhow::Context;
use shared_types::OutreachEmail;
use std::fs;
use std::path::{Path, PathBuf};

pub const OUTREACH_CSV: &str = "out.csv";

/// Writes `<row>-<patient_id>.txt` per email plus an `out.csv` index.
/// A patient drafted for several conditions gets one file per row.
/// Returns the path of the CSV file.
pub fn write_outreach(dir: &Path, emails: &[OutreachEmail]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    for (row, email) in emails.iter().enumerate() {
        let path = dir.join(format!("{}-{}.txt", row + 1, file_stem(&email.patient_id)));
        let to = email.email.as_deref().unwrap_or("(no email on record)");
        let contents = format!(
            "To: {} <{}>\nSubject: {}\n\n{}\n",
            email.full_name, to, email.subject, email.body
        );
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let csv_path = dir.join(OUTREACH_CSV);
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    for email in emails {
        writer.serialize(email)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} outreach emails to {}", emails.len(), dir.display());
    Ok(csv_path)
}

/// Patient ids come from the server; keep them from escaping `dir`
fn file_stem(patient_id: &str) -> String {
    patient_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
