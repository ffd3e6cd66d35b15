use std::fs;
use std::path::Path;

use otadrop_core::{CandidateNaming, NameMatch, StatusEvent, StatusSink, UpdateCandidate};

// Scans the drop directory in listing order. The first qualifying entry
// wins; the rest of the listing is still walked so that every package
// built for another model is reported rather than silently dropped.
pub fn locate_candidate(
    source_dir: &Path,
    naming: &CandidateNaming,
    sink: &mut dyn StatusSink,
) -> Option<UpdateCandidate> {
    sink.record(StatusEvent::ScanStarted {
        source_dir: source_dir.display().to_string(),
    });

    let entries = match fs::read_dir(source_dir) {
        Ok(entries) => entries,
        Err(err) => {
            sink.record(StatusEvent::SourceUnavailable {
                detail: format!("failed to read {}: {err}", source_dir.display()),
            });
            return None;
        }
    };

    let mut selected: Option<UpdateCandidate> = None;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                sink.record(StatusEvent::SourceUnavailable {
                    detail: format!("failed reading entry of {}: {err}", source_dir.display()),
                });
                return None;
            }
        };

        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };

        match naming.classify(&name) {
            NameMatch::Ignored => continue,
            NameMatch::SkippedModel => {
                sink.record(StatusEvent::CandidateSkipped { name });
            }
            NameMatch::Qualifying => {
                if selected.is_some() {
                    continue;
                }
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        sink.record(StatusEvent::SourceUnavailable {
                            detail: format!("failed to stat {name}: {err}"),
                        });
                        return None;
                    }
                };
                if !metadata.is_file() {
                    continue;
                }
                selected = Some(UpdateCandidate {
                    path: entry.path(),
                    size_bytes: metadata.len(),
                    name,
                });
            }
        }
    }

    match selected {
        Some(candidate) => {
            sink.record(StatusEvent::CandidateSelected {
                name: candidate.name.clone(),
                size_bytes: candidate.size_bytes,
            });
            Some(candidate)
        }
        None => {
            sink.record(StatusEvent::NoCandidate {
                detail: format!(
                    "no entry in {} matches prefix '{}' for this device",
                    source_dir.display(),
                    naming.prefix()
                ),
            });
            None
        }
    }
}
