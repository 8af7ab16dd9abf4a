use std::path::{Path, PathBuf};

use crate::media::audio::{AudioClip, AudioNode};
use crate::media::clip::{junction_overlaps, ConcatMethod, VideoClip, VideoNode};

/// Sample format every audio stream is converted to before it is joined
const AUDIO_FORMAT: &str = "aresample=44100,aformat=sample_fmts=fltp:channel_layouts=stereo";

/// Rate set by [`AUDIO_FORMAT`]; `aloop` counts its buffer in samples
const AUDIO_SAMPLE_RATE: f64 = 44100.0;

/// Builder that turns clip descriptions into an ffmpeg `-filter_complex` graph
///
/// Every source clip met while walking a description becomes its own `-i`
/// input. A looped soundtrack is still a single input, repeated in the graph
/// with `aloop`. Video and audio are compiled separately so that each encoder
/// pass only carries the streams it maps.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    fps: f64,
    inputs: Vec<PathBuf>,
    chains: Vec<String>,
    next_label: usize,
}

impl FilterGraph {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            inputs: Vec::new(),
            chains: Vec::new(),
            next_label: 0,
        }
    }

    /// Files to open, in input-index order
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// `-i <path>` pairs for every input
    pub fn input_args(&self) -> Vec<String> {
        self.inputs
            .iter()
            .flat_map(|path| ["-i".to_string(), path.display().to_string()])
            .collect()
    }

    /// The graph in ffmpeg's textual syntax
    pub fn description(&self) -> String {
        self.chains.join(";")
    }

    fn add_input(&mut self, path: &Path) -> usize {
        self.inputs.push(path.to_path_buf());
        self.inputs.len() - 1
    }

    /// Append a chain and return the label of its output pad
    fn push(&mut self, inputs: &[String], filter: &str, kind: char) -> String {
        let output = format!("[{}{}]", kind, self.next_label);
        self.next_label += 1;
        self.chains.push(format!("{}{}{}", inputs.concat(), filter, output));
        output
    }

    // ==========================================
    // PICTURE
    // ==========================================

    /// Compile the picture of `clip`, returning its output label
    pub fn video(&mut self, clip: &VideoClip) -> String {
        match clip.node() {
            VideoNode::Source(source) => {
                let index = self.add_input(&source.path);
                let chain = format!(
                    "fps={},setpts=PTS-STARTPTS,setsar=1,format=yuv420p",
                    self.fps
                );
                self.push(&[format!("[{}:v]", index)], &chain, 'v')
            }
            VideoNode::Resized(input) => {
                let label = self.video(input);
                let chain = format!("scale={}:{},setsar=1", clip.width(), clip.height());
                self.push(&[label], &chain, 'v')
            }
            VideoNode::Filtered { input, filter } => {
                let label = self.video(input);
                match filter.ffmpeg_chain() {
                    Some(chain) => self.push(&[label], &format!("{},format=yuv420p", chain), 'v'),
                    None => label,
                }
            }
            // The fade itself is rendered at the junction by `join_video`
            VideoNode::CrossFadeOut { input, .. } => self.video(input),
            VideoNode::SlideOut { input, hold } => {
                let label = self.video(input);
                let background = format!(
                    "color=c=black:s={}x{}:r={}:d={}",
                    clip.width(),
                    clip.height(),
                    self.fps,
                    secs(clip.duration())
                );
                let background = self.push(&[], &background, 'v');
                let hold = secs(*hold);
                let overlay = format!(
                    "overlay=x='if(lt(t,{hold}),0,-(t-{hold})*{width})':y=0:shortest=1,format=yuv420p",
                    hold = hold,
                    width = clip.width()
                );
                self.push(&[background, label], &overlay, 'v')
            }
            VideoNode::Concat { clips, method } => {
                let canvas = clip.size();
                let labels: Vec<String> = clips
                    .iter()
                    .map(|part| {
                        let label = self.video(part);
                        self.fit_to_canvas(label, part.size(), canvas, *method)
                    })
                    .collect();
                self.join_video(labels, clips)
            }
            VideoNode::WithAudio { input, .. } => self.video(input),
        }
    }

    fn fit_to_canvas(
        &mut self,
        label: String,
        size: (u32, u32),
        canvas: (u32, u32),
        method: ConcatMethod,
    ) -> String {
        if size == canvas {
            return label;
        }
        let chain = match method {
            ConcatMethod::Chain => format!("scale={}:{},setsar=1", canvas.0, canvas.1),
            ConcatMethod::Compose => format!(
                "pad={}:{}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1",
                canvas.0, canvas.1
            ),
        };
        self.push(&[label], &chain, 'v')
    }

    fn join_video(&mut self, labels: Vec<String>, clips: &[VideoClip]) -> String {
        let overlaps = junction_overlaps(clips);
        let mut labels = labels.into_iter();
        let mut joined = labels.next().unwrap_or_default();
        let mut joined_duration = clips.first().map(VideoClip::duration).unwrap_or_default();

        for ((label, next), overlap) in labels.zip(clips.iter().skip(1)).zip(overlaps) {
            let chain = if overlap > 0.0 {
                format!(
                    "xfade=transition=fade:duration={}:offset={}",
                    secs(overlap),
                    secs(joined_duration - overlap)
                )
            } else {
                "concat=n=2:v=1:a=0".to_string()
            };
            joined = self.push(&[joined, label], &chain, 'v');
            joined_duration += next.duration() - overlap;
        }

        joined
    }

    // ==========================================
    // SOUND
    // ==========================================

    /// Compile the soundtrack carried by `clip`, returning its output label
    ///
    /// Sources without an audio stream contribute silence of the same length
    /// so that junctions stay in step with the picture.
    pub fn soundtrack(&mut self, clip: &VideoClip) -> String {
        match clip.node() {
            VideoNode::Source(source) => {
                let duration = secs(clip.duration());
                if source.info.has_audio {
                    let index = self.add_input(&source.path);
                    let chain = format!(
                        "{},asetpts=PTS-STARTPTS,apad,atrim=end={}",
                        AUDIO_FORMAT, duration
                    );
                    self.push(&[format!("[{}:a]", index)], &chain, 'a')
                } else {
                    let chain = format!(
                        "anullsrc=r=44100:cl=stereo,atrim=end={},{}",
                        duration, AUDIO_FORMAT
                    );
                    self.push(&[], &chain, 'a')
                }
            }
            VideoNode::Resized(input)
            | VideoNode::Filtered { input, .. }
            | VideoNode::CrossFadeOut { input, .. }
            | VideoNode::SlideOut { input, .. } => self.soundtrack(input),
            VideoNode::Concat { clips, .. } => {
                let labels: Vec<String> = clips.iter().map(|part| self.soundtrack(part)).collect();
                self.join_soundtrack(labels, clips)
            }
            VideoNode::WithAudio { audio, .. } => self.audio(audio),
        }
    }

    fn join_soundtrack(&mut self, labels: Vec<String>, clips: &[VideoClip]) -> String {
        let overlaps = junction_overlaps(clips);
        let mut labels = labels.into_iter();
        let mut joined = labels.next().unwrap_or_default();

        for (label, overlap) in labels.zip(overlaps) {
            let chain = if overlap > 0.0 {
                format!("acrossfade=d={}", secs(overlap))
            } else {
                "concat=n=2:v=0:a=1".to_string()
            };
            joined = self.push(&[joined, label], &chain, 'a');
        }

        joined
    }

    /// Compile a standalone audio clip, returning its output label
    pub fn audio(&mut self, clip: &AudioClip) -> String {
        match clip.node() {
            AudioNode::Source(source) => {
                let index = self.add_input(&source.path);
                let chain = format!("{},asetpts=PTS-STARTPTS", AUDIO_FORMAT);
                self.push(&[format!("[{}:a]", index)], &chain, 'a')
            }
            AudioNode::Concat(parts) => {
                let labels: Vec<String> = parts.iter().map(|part| self.audio(part)).collect();
                if labels.len() == 1 {
                    return labels.concat();
                }
                let chain = format!("concat=n={}:v=0:a=1", labels.len());
                self.push(&labels, &chain, 'a')
            }
            AudioNode::Loop { input, repeats } => {
                let label = self.audio(input);
                if *repeats <= 1 {
                    return label;
                }
                // Extra plays after the first; the buffer holds one whole pass
                let samples = (input.duration() * AUDIO_SAMPLE_RATE)
                    .ceil()
                    .min(i32::MAX as f64) as i64;
                let chain = format!(
                    "aloop=loop={}:size={},asetpts=N/SR/TB",
                    repeats - 1,
                    samples
                );
                self.push(&[label], &chain, 'a')
            }
            AudioNode::Subclip { input, start, end } => {
                let label = self.audio(input);
                let chain = format!(
                    "atrim=start={}:end={},asetpts=PTS-STARTPTS",
                    secs(*start),
                    secs(*end)
                );
                self.push(&[label], &chain, 'a')
            }
        }
    }
}

/// Seconds with millisecond precision, the way ffmpeg options take them
pub(crate) fn secs(value: f64) -> String {
    format!("{:.3}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Filter, Transition};
    use crate::media::audio::fit_to_duration;
    use crate::media::testing::{audio_clip, silent_video_clip, video_clip};

    fn prepared(name: &str, duration: f64) -> VideoClip {
        video_clip(name, duration).resized(1280, 720)
    }

    #[test]
    fn test_single_source_chain() {
        let mut graph = FilterGraph::new(24.0);
        let label = graph.video(&prepared("a.mp4", 3.0));

        assert_eq!(label, "[v1]");
        assert_eq!(graph.inputs().len(), 1);
        assert_eq!(
            graph.description(),
            "[0:v]fps=24,setpts=PTS-STARTPTS,setsar=1,format=yuv420p[v0];[v0]scale=1280:720,setsar=1[v1]"
        );
        assert_eq!(graph.input_args(), vec!["-i".to_string(), "a.mp4".to_string()]);
    }

    #[test]
    fn test_filter_becomes_chain() {
        let mut graph = FilterGraph::new(24.0);
        graph.video(&Filter::Invert.apply(prepared("a.mp4", 3.0)));
        assert!(graph.description().contains("negate,format=yuv420p"));
    }

    #[test]
    fn test_fade_offsets_track_overlaps() {
        let clips = vec![prepared("a.mp4", 5.0), prepared("b.mp4", 5.0), prepared("c.mp4", 5.0)];
        let joined = Transition::Fade.apply(clips).unwrap();

        let mut graph = FilterGraph::new(24.0);
        graph.video(&joined);
        let description = graph.description();

        assert_eq!(description.matches("xfade=").count(), 2);
        assert!(description.contains("xfade=transition=fade:duration=1.000:offset=4.000"));
        assert!(description.contains("xfade=transition=fade:duration=1.000:offset=8.000"));
        assert_eq!(graph.inputs().len(), 3);
    }

    #[test]
    fn test_hard_cut_uses_concat() {
        let clips = vec![prepared("a.mp4", 2.0), prepared("b.mp4", 2.0)];
        let joined = Transition::None.apply(clips).unwrap();

        let mut graph = FilterGraph::new(24.0);
        graph.video(&joined);
        assert!(graph.description().contains("concat=n=2:v=1:a=0"));
        assert!(!graph.description().contains("xfade"));
    }

    #[test]
    fn test_slide_overlays_on_background() {
        let clips = vec![prepared("a.mp4", 5.0), prepared("b.mp4", 3.0)];
        let joined = Transition::Slide.apply(clips).unwrap();

        let mut graph = FilterGraph::new(24.0);
        graph.video(&joined);
        let description = graph.description();

        assert!(description.contains("color=c=black:s=1280x720:r=24:d=5.000"));
        assert!(description.contains("overlay=x='if(lt(t,4.000),0,-(t-4.000)*1280)':y=0"));
        assert_eq!(description.matches("overlay=").count(), 1);
    }

    #[test]
    fn test_compose_pads_smaller_clips() {
        let clips = vec![
            video_clip("a.mp4", 2.0).resized(1280, 720).slide_out(1.0),
            video_clip("b.mp4", 2.0).resized(640, 360),
        ];
        let joined = VideoClip::concatenate(clips, ConcatMethod::Compose).unwrap();

        let mut graph = FilterGraph::new(24.0);
        graph.video(&joined);
        assert!(graph.description().contains("pad=1280:720:(ow-iw)/2:(oh-ih)/2"));
    }

    #[test]
    fn test_fitted_soundtrack_loops_single_input() {
        let video = prepared("a.mp4", 10.0);
        let audio = fit_to_duration(audio_clip("song.mp3", 4.0), video.duration()).unwrap();
        let clip = video.with_audio(audio);

        let mut graph = FilterGraph::new(24.0);
        graph.soundtrack(&clip);
        let description = graph.description();

        assert_eq!(graph.inputs().len(), 1);
        assert!(graph.inputs()[0].ends_with("song.mp3"));
        assert!(description.contains("aloop=loop=2:size=176400"));
        assert!(description.contains("atrim=start=0.000:end=10.000"));
        assert!(!description.contains("concat"));
    }

    #[test]
    fn test_short_jingle_keeps_input_count_flat() {
        let video = prepared("a.mp4", 1800.0);
        let audio = fit_to_duration(audio_clip("jingle.mp3", 1.5), video.duration()).unwrap();
        let clip = video.with_audio(audio);

        let mut graph = FilterGraph::new(24.0);
        graph.soundtrack(&clip);

        assert_eq!(graph.inputs().len(), 1);
        assert_eq!(graph.input_args().len(), 2);
        assert!(graph.description().contains("aloop=loop=1199:size=66150"));
    }

    #[test]
    fn test_distinct_audio_files_are_concatenated() {
        let audio = AudioClip::concatenate(vec![audio_clip("a.mp3", 2.0), audio_clip("b.mp3", 3.0)]);

        let mut graph = FilterGraph::new(24.0);
        graph.audio(&audio);

        assert_eq!(graph.inputs().len(), 2);
        assert!(graph.description().contains("concat=n=2:v=0:a=1"));
    }

    #[test]
    fn test_silent_sources_become_silence() {
        let clips = vec![
            silent_video_clip("a.mp4", 3.0).resized(1280, 720),
            prepared("b.mp4", 3.0),
        ];
        let joined = Transition::Fade.apply(clips).unwrap();

        let mut graph = FilterGraph::new(24.0);
        graph.soundtrack(&joined);
        let description = graph.description();

        assert!(description.contains("anullsrc=r=44100:cl=stereo,atrim=end=3.000"));
        assert!(description.contains("acrossfade=d=1.000"));
        assert_eq!(graph.inputs().len(), 1);
    }
}
