//! Human-readable summary of a parsed report.

use ms_stream::{MediaReport, Track};
use std::fmt::Write;

/// Render the container and per-track highlights of `report`.
pub fn render_summary(report: &MediaReport) -> String {
    let mut out = String::new();

    if let Some(general) = report.general() {
        let _ = writeln!(out, "Container: {}", general.get("Format").unwrap_or("unknown"));
        if let Some(size) = general.numeric::<u64>("FileSize") {
            let _ = writeln!(out, "Size: {} bytes", size);
        }
        if let Some(duration) = general.numeric::<f64>("Duration") {
            let _ = writeln!(out, "Duration: {}", format_duration(duration));
        }
    }

    let video: Vec<&Track> = report.tracks_of("Video").collect();
    let _ = writeln!(out, "\nVideo Tracks: {}", video.len());
    for (i, track) in video.iter().enumerate() {
        let _ = write!(out, "  [{}] {}", i, track.get("Format").unwrap_or("?"));
        let width = track.numeric::<u32>("Width");
        let height = track.numeric::<u32>("Height");
        if let (Some(w), Some(h)) = (width, height) {
            let _ = write!(out, " {}x{}", w, h);
        }
        if let Some(fps) = track.numeric::<f64>("FrameRate") {
            let _ = write!(out, ", {:.3} fps", fps);
        }
        if let Some(bits) = track.numeric::<u8>("BitDepth") {
            let _ = write!(out, ", {} bit", bits);
        }
        out.push('\n');
        if let Some(hdr) = track.get("HDR_Format") {
            let _ = writeln!(out, "      HDR: {}", hdr);
        }
    }

    let audio: Vec<&Track> = report.tracks_of("Audio").collect();
    let _ = writeln!(out, "\nAudio Tracks: {}", audio.len());
    for (i, track) in audio.iter().enumerate() {
        let _ = write!(out, "  [{}] {}", i, track.get("Format").unwrap_or("?"));
        if let Some(channels) = track.numeric::<u32>("Channels") {
            let _ = write!(out, " {}ch", channels);
        }
        push_flags(&mut out, track);
    }

    let text: Vec<&Track> = report.tracks_of("Text").collect();
    let _ = writeln!(out, "\nSubtitle Tracks: {}", text.len());
    for (i, track) in text.iter().enumerate() {
        let _ = write!(out, "  [{}] {}", i, track.get("Format").unwrap_or("?"));
        push_flags(&mut out, track);
    }

    out
}

fn push_flags(out: &mut String, track: &Track) {
    if let Some(lang) = track.get("Language") {
        let _ = write!(out, " ({})", lang);
    }
    if track.get("Forced") == Some("Yes") {
        out.push_str(" [forced]");
    }
    if track.get("Default") == Some("Yes") {
        out.push_str(" [default]");
    }
    out.push('\n');
}

/// Seconds as `HH:MM:SS`.
fn format_duration(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    let mins = secs / 60;
    let hours = mins / 60;
    format!("{:02}:{:02}:{:02}", hours, mins % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "media": {
            "@ref": "",
            "track": [
                {"@type": "General", "Format": "Matroska", "FileSize": "734003200", "Duration": "5423.104"},
                {"@type": "Video", "Format": "HEVC", "Width": "3840", "Height": "2160", "FrameRate": "23.976", "BitDepth": "10", "HDR_Format": "SMPTE ST 2086"},
                {"@type": "Audio", "Format": "E-AC-3", "Channels": "6", "Language": "en", "Default": "Yes"},
                {"@type": "Text", "Format": "UTF-8", "Language": "fr", "Forced": "Yes"}
            ]
        }
    }"#;

    #[test]
    fn summary_lists_every_track() {
        let report = MediaReport::from_json(REPORT).unwrap();
        let text = render_summary(&report);

        assert!(text.contains("Container: Matroska"));
        assert!(text.contains("Size: 734003200 bytes"));
        assert!(text.contains("Duration: 01:30:23"));
        assert!(text.contains("[0] HEVC 3840x2160, 23.976 fps, 10 bit"));
        assert!(text.contains("HDR: SMPTE ST 2086"));
        assert!(text.contains("[0] E-AC-3 6ch (en) [default]"));
        assert!(text.contains("[0] UTF-8 (fr) [forced]"));
    }

    #[test]
    fn empty_report_still_renders_counts() {
        let text = render_summary(&MediaReport::default());
        assert!(text.contains("Video Tracks: 0"));
        assert!(text.contains("Audio Tracks: 0"));
        assert!(!text.contains("Container"));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(61.9), "00:01:01");
        assert_eq!(format_duration(3600.0), "01:00:00");
    }
}
