use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use otadrop_core::UpdateCandidate;

use crate::layout::StagingLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPackage {
    pub path: PathBuf,
    pub source: UpdateCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingReport {
    pub package: StagedPackage,
    pub replaced_stale: bool,
}

pub fn stage_candidate(layout: &StagingLayout, candidate: &UpdateCandidate) -> Result<StagingReport> {
    stage_candidate_with_copier(layout, candidate, |source, target| {
        io::copy(source, target).map_err(Into::into)
    })
}

// The copy hook exists so tests can fail the transfer mid-stream; the
// production path is io::copy, which takes the fastest whole-file route
// the host offers.
pub(crate) fn stage_candidate_with_copier<CopyContent>(
    layout: &StagingLayout,
    candidate: &UpdateCandidate,
    mut copy_content: CopyContent,
) -> Result<StagingReport>
where
    CopyContent: FnMut(&mut File, &mut File) -> Result<u64>,
{
    layout.ensure_base_dirs()?;

    let target_path = layout.staged_path(&candidate.name);
    // Never trust a leftover staged file of the same name; a half-written
    // remnant would look like a valid package to the installer.
    let replaced_stale = target_path.exists();
    if replaced_stale {
        fs::remove_file(&target_path).with_context(|| {
            format!(
                "failed to remove stale staged package: {}",
                target_path.display()
            )
        })?;
    }

    let mut source = File::open(&candidate.path).with_context(|| {
        format!(
            "failed to open update package source: {}",
            candidate.path.display()
        )
    })?;
    let mut target = File::create(&target_path).with_context(|| {
        format!(
            "failed to create staged package: {}",
            target_path.display()
        )
    })?;

    let transferred = copy_content(&mut source, &mut target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            candidate.path.display(),
            target_path.display()
        )
    })?;

    if transferred != candidate.size_bytes {
        return Err(anyhow!(
            "staging transfer incomplete for {}: copied {} of {} bytes",
            target_path.display(),
            transferred,
            candidate.size_bytes
        ));
    }

    target.sync_all().with_context(|| {
        format!(
            "failed to flush staged package to disk: {}",
            target_path.display()
        )
    })?;

    Ok(StagingReport {
        package: StagedPackage {
            path: target_path,
            source: candidate.clone(),
        },
        replaced_stale,
    })
}
