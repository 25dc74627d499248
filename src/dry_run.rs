use std::io::Write;

/// When `Some`, no files are written. What _would_ be written goes to the contained writer instead
/// (stdout for the binary, a buffer in tests).
pub(crate) type DryRun<'a> = &'a mut Option<Box<dyn Write>>;

#[cfg(test)]
pub(crate) fn fake_dry_run() -> Option<Box<dyn Write>> {
    Some(Box::new(Vec::new()))
}
