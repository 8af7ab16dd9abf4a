use std::path::{Path, PathBuf};

use crate::config::EncodeConfig;
use crate::media::clip::VideoClip;
use crate::media::graph::{secs, FilterGraph};
use crate::media::types::ExportFormat;

/// Codec of the intermediate soundtrack file
const SCRATCH_AUDIO_CODEC: &str = "aac";

/// The two encoder invocations that render a clip to a file
///
/// The soundtrack is rendered first into an audio-only scratch file, then
/// the picture is rendered and muxed with it into the final container.
#[derive(Debug, Clone)]
pub struct EncodePlan {
    pub soundtrack_pass: Vec<String>,
    pub picture_pass: Vec<String>,
    pub temp_audio: PathBuf,
    pub output: PathBuf,
    pub duration: f64,
}

impl EncodePlan {
    pub fn build(
        clip: &VideoClip,
        format: ExportFormat,
        encode: &EncodeConfig,
        output: &Path,
        temp_audio: &Path,
    ) -> Self {
        let duration = secs(clip.duration());

        let mut graph = FilterGraph::new(encode.fps);
        let soundtrack = graph.soundtrack(clip);
        let mut soundtrack_pass = base_args();
        soundtrack_pass.extend(graph.input_args());
        soundtrack_pass.extend(strings(&[
            "-filter_complex",
            &graph.description(),
            "-map",
            &soundtrack,
            "-vn",
            "-c:a",
            SCRATCH_AUDIO_CODEC,
            "-b:a",
            &encode.audio_bitrate,
            "-t",
            &duration,
        ]));
        soundtrack_pass.push(temp_audio.display().to_string());

        let mut graph = FilterGraph::new(encode.fps);
        let picture = graph.video(clip);
        let soundtrack_input = graph.inputs().len();
        let mut picture_pass = base_args();
        picture_pass.extend(graph.input_args());
        picture_pass.extend(strings(&["-i", &temp_audio.display().to_string()]));
        picture_pass.extend(strings(&[
            "-filter_complex",
            &graph.description(),
            "-map",
            &picture,
            "-map",
            &format!("{}:a", soundtrack_input),
            "-c:v",
            format.video_codec(),
            "-preset",
            &encode.preset,
            "-crf",
            &encode.crf.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-r",
            &encode.fps.to_string(),
            "-c:a",
            format.audio_codec(),
            "-b:a",
            &encode.audio_bitrate,
            "-t",
            &duration,
        ]));
        picture_pass.extend(strings(format.muxer_args()));
        picture_pass.push(output.display().to_string());

        Self {
            soundtrack_pass,
            picture_pass,
            temp_audio: temp_audio.to_path_buf(),
            output: output.to_path_buf(),
            duration: clip.duration(),
        }
    }
}

fn base_args() -> Vec<String> {
    strings(&["-hide_banner", "-loglevel", "error", "-y"])
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
