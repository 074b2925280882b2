//! Backtrace capture via the `backtrace` crate.

use super::normalize::RawFrame;

/// Capture the calling thread's stack, most recent call first.
///
/// Frames belonging to the backtrace machinery and this module are skipped so
/// the first frame is the caller of whatever asked for the capture.
pub fn capture_raw_frames() -> Vec<RawFrame> {
    let backtrace = backtrace::Backtrace::new();

    let mut frames: Vec<RawFrame> = backtrace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| RawFrame {
            file: symbol.filename().map(|p| p.display().to_string()),
            line: symbol.lineno(),
            // Alternate form drops the `::h<hash>` suffix from demangled names.
            function: symbol.name().map(|n| format!("{:#}", n)),
            ..Default::default()
        })
        .collect();

    let internal = frames
        .iter()
        .take_while(|f| is_capture_machinery(f.function.as_deref()))
        .count();
    frames.drain(..internal);
    frames
}

fn is_capture_machinery(function: Option<&str>) -> bool {
    match function {
        Some(name) => {
            name.starts_with("backtrace::")
                || name.contains("frames::capture::")
                || name.contains("::capture")
        }
        None => true,
    }
}
