//! `hotpatch classify`: report the verdict for an edit between two files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::classify::Classifier;
use crate::config::HotpatchConfig;
use crate::core::{Classification, ComponentKind, SourceKind};
use crate::instrument::{ComponentInfo, InstrumentOptions, scan};

/// Outcome for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Changed(Classification),
    /// Present in the old file only
    Removed,
    /// Present in the new file only
    Added,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed(c) => write!(f, "{c}"),
            Self::Removed => f.write_str("removed"),
            Self::Added => f.write_str("added"),
        }
    }
}

/// Print verdicts for `old` -> `new`.
///
/// Component sources are compared declaration by declaration; any other
/// file is treated as a single declaration of shape `kind`.
pub fn classify_files(
    old: &Path,
    new: &Path,
    kind: ComponentKind,
    name: Option<&str>,
    config: &HotpatchConfig,
) -> Result<()> {
    let options = config.instrument_options();
    let old_source = read(old)?;
    let new_source = read(new)?;

    let gated = SourceKind::from_path(new, &options.extensions).is_some();
    if !gated {
        if name.is_some() {
            bail!("--name needs component sources ({})", options.extensions.join(", "));
        }
        let classifier = Classifier::new(options.build_method.clone());
        println!("{}", classifier.classify(&old_source, &new_source, kind));
        return Ok(());
    }

    let verdicts = compare(
        (&old_source, old),
        (&new_source, new),
        name,
        &options,
    )?;
    for (component, verdict) in verdicts {
        println!("{component}: {verdict}");
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Per-declaration verdicts, in new-file order followed by removals.
fn compare(
    old: (&str, &Path),
    new: (&str, &Path),
    name: Option<&str>,
    options: &InstrumentOptions,
) -> Result<Vec<(String, Verdict)>> {
    // the old file is scanned under the new path so both pass the same gate
    let before = scan(old.0, new.1, options)
        .with_context(|| format!("failed to scan {}", old.1.display()))?;
    let after = scan(new.0, new.1, options)?;

    let classifier = Classifier::new(options.build_method.clone());
    let wanted = |c: &&ComponentInfo| name.is_none_or(|n| c.name == n);

    let mut verdicts: Vec<_> = after
        .iter()
        .filter(wanted)
        .map(|current| {
            let verdict = match before.iter().find(|c| c.name == current.name) {
                Some(prev) if prev.kind != current.kind => {
                    Verdict::Changed(Classification::Structural)
                }
                Some(prev) => Verdict::Changed(classifier.classify(
                    &prev.source,
                    &current.source,
                    current.kind,
                )),
                None => Verdict::Added,
            };
            (current.name.clone(), verdict)
        })
        .collect();

    verdicts.extend(
        before
            .iter()
            .filter(wanted)
            .filter(|prev| !after.iter().any(|c| c.name == prev.name))
            .map(|prev| (prev.name.clone(), Verdict::Removed)),
    );

    if let Some(name) = name
        && verdicts.is_empty()
    {
        bail!("component `{name}` not found in either file");
    }
    Ok(verdicts)
}
