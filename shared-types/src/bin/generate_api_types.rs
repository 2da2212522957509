use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut types = Vec::new();

    // Cohort types
    types.push(clean_type(AgeRange::export_to_string()?));
    types.push(clean_type(PatientSummary::export_to_string()?));
    types.push(clean_type(CohortSearchRequest::export_to_string()?));
    types.push(clean_type(CohortOutcome::export_to_string()?));

    // Outreach types
    types.push(clean_type(OutreachEmail::export_to_string()?));
    types.push(clean_type(CreateOutreachRunRequest::export_to_string()?));
    types.push(clean_type(OutreachRunResponse::export_to_string()?));

    // Session types
    types.push(clean_type(SessionMessage::export_to_string()?));
    types.push(clean_type(SessionToolCall::export_to_string()?));
    types.push(clean_type(SessionResponse::export_to_string()?));

    let output_dir = Path::new("../bindings");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    fs::write(&output_path, types.join("\n\n"))?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

/// Strips the generator banner and, for types that reference others,
/// keeps the `import type` lines so the combined file stays valid.
fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("import type") {
                return has_import;
            }
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
