/*!
 * Audiobook container export.
 *
 * Writes the assembled waveform out through ffmpeg: the waveform is encoded
 * to an intermediate AAC artifact, the chapter markers are rendered to an
 * ffmetadata file, and a final mux pass merges both into the chaptered
 * `.m4b` container. All intermediate artifacts are scoped temporary files,
 * removed on success and on every failure path alike.
 */

use std::ffi::OsString;
use std::path::Path;

use log::{debug, error, info};
use tokio::process::Command;

use crate::audio::AudioBuffer;
use crate::errors::ExportError;
use crate::pipeline::assembler::ChapterMarker;

/// Title tag written to the container
const CONTAINER_TITLE: &str = "Audiobook";

/// Artist tag written to the container
const CONTAINER_ARTIST: &str = "bookvox";

/// Time budget for each ffmpeg invocation
const FFMPEG_TIMEOUT_SECS: u64 = 600;

/// Render chapter markers as an ffmetadata chapter file.
///
/// One `[CHAPTER]` stanza per marker, with integer-second start/end offsets
/// on a one-second timebase.
pub fn render_chapter_metadata(markers: &[ChapterMarker]) -> String {
    let mut rendered = String::from(";FFMETADATA1\n");
    for marker in markers {
        let start_secs = marker.start_ms / 1000;
        let end_secs = marker.end_ms / 1000;
        rendered.push_str(&format!(
            "[CHAPTER]\nTIMEBASE=1/1\nSTART={}\nEND={}\ntitle={}\n\n",
            start_secs,
            end_secs,
            escape_metadata_value(&marker.title)
        ));
    }
    rendered
}

/// Escape the characters the ffmetadata format treats specially.
fn escape_metadata_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '=' | ';' | '#' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Export the waveform and chapter markers into a chaptered m4b container.
///
/// Failures are returned to the caller after cleanup; no intermediate
/// artifact survives this call on any path.
pub async fn export_audiobook(
    waveform: &AudioBuffer,
    markers: &[ChapterMarker],
    output_path: &Path,
) -> Result<(), ExportError> {
    // Intermediate waveform artifact
    let wav_artifact = tempfile::Builder::new()
        .prefix("bookvox-export-")
        .suffix(".wav")
        .tempfile()?;
    waveform.write_wav(wav_artifact.path())?;

    // Encode to AAC
    let encoded_artifact = tempfile::Builder::new()
        .prefix("bookvox-export-")
        .suffix(".m4a")
        .tempfile()?;
    debug!("Encoding waveform to {:?}", encoded_artifact.path());
    run_ffmpeg(vec![
        OsString::from("-y"),
        OsString::from("-i"),
        wav_artifact.path().into(),
        OsString::from("-c:a"),
        OsString::from("aac"),
        encoded_artifact.path().into(),
    ])
    .await
    .map_err(ExportError::Encode)?;

    // Chapter metadata artifact
    let chapters_artifact = tempfile::Builder::new()
        .prefix("bookvox-chapters-")
        .suffix(".txt")
        .tempfile()?;
    std::fs::write(chapters_artifact.path(), render_chapter_metadata(markers))?;

    // Mux audio and chapter metadata into the final container
    debug!("Muxing audiobook to {:?}", output_path);
    run_ffmpeg(vec![
        OsString::from("-y"),
        OsString::from("-i"),
        encoded_artifact.path().into(),
        OsString::from("-f"),
        OsString::from("ffmetadata"),
        OsString::from("-i"),
        chapters_artifact.path().into(),
        OsString::from("-map_chapters"),
        OsString::from("1"),
        OsString::from("-map"),
        OsString::from("0"),
        OsString::from("-codec"),
        OsString::from("copy"),
        OsString::from("-metadata"),
        OsString::from(format!("title={}", CONTAINER_TITLE)),
        OsString::from("-metadata"),
        OsString::from(format!("artist={}", CONTAINER_ARTIST)),
        OsString::from("-movflags"),
        OsString::from("+faststart"),
        output_path.into(),
    ])
    .await
    .map_err(ExportError::Mux)?;

    info!(
        "Exported audiobook with {} chapters to {:?}",
        markers.len(),
        output_path
    );
    Ok(())
}

/// Run ffmpeg with the given arguments, enforcing a time budget.
async fn run_ffmpeg(args: Vec<OsString>) -> Result<(), String> {
    let ffmpeg_future = Command::new("ffmpeg")
        .args(&args)
        .kill_on_drop(true)
        .output();

    let timeout = std::time::Duration::from_secs(FFMPEG_TIMEOUT_SECS);
    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| format!("Failed to execute ffmpeg: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(format!("ffmpeg timed out after {} seconds", FFMPEG_TIMEOUT_SECS));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("ffmpeg failed: {}", filtered);
        return Err(filtered);
    }

    Ok(())
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "size=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            !line.trim().is_empty()
                && !dominated_prefixes
                    .iter()
                    .any(|prefix| line.starts_with(prefix))
        })
        .collect();

    if meaningful.is_empty() {
        "ffmpeg reported no diagnostic output".to_string()
    } else {
        meaningful.join("; ")
    }
}
