//! Output file state for one publish run.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};
use talkbook_audio::wav::hash_pcm_stream;
use talkbook_audio::{AudioError, AudioMediaData, PcmDataInfo, PcmFormat, WavStreamWriter};
use talkbook_model::presentation::file_uri;
use talkbook_model::{ChannelRegistry, MediaKind};
use url::Url;

use crate::config::PublishConfig;
use crate::error::{PublishError, PublishResult};

/// A finalized output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFile {
    /// File name inside the destination directory.
    pub name: String,
    /// URI of the file relative to the presentation base URI.
    pub src: String,
    /// Absolute path on disk.
    #[serde(skip)]
    pub path: PathBuf,
    /// PCM format of the payload.
    pub format: PcmFormat,
    /// Payload bytes, excluding header and pad byte.
    pub data_length: u64,
    /// Payload duration.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// BLAKE3 hash of the payload as read back from disk.
    pub blake3: String,
}

/// Position of one appended payload inside the current output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedClip {
    /// Name of the output file.
    pub file: String,
    /// URI of the output file relative to the presentation base URI.
    pub src: String,
    /// Offset of the payload within the file.
    pub clip_begin: Duration,
    /// End of the payload within the file.
    pub clip_end: Duration,
}

struct OpenFile {
    name: String,
    src: String,
    path: PathBuf,
    writer: WavStreamWriter<BufWriter<File>>,
}

/// Mutable state of a publish run: the open output file and the files
/// finished so far.
///
/// A session is single-use. Files are opened lazily: nothing is created
/// until the first payload is appended, and [`PublishSession::start_new_file`]
/// only closes the current file. Dropping a session without calling
/// [`PublishSession::finish`] still patches the header of the open file.
pub struct PublishSession {
    dest_dir: PathBuf,
    base_uri: Url,
    source_channel: String,
    destination_channel: String,
    config: PublishConfig,
    next_index: u32,
    current: Option<OpenFile>,
    files: Vec<PublishedFile>,
}

impl PublishSession {
    /// Prepares a session writing into `dest_dir`.
    ///
    /// # Errors
    /// - [`PublishError::InvalidConfig`] if the configuration does not validate
    /// - [`PublishError::UnknownChannel`] if a configured channel is missing
    /// - [`PublishError::Factory`] if the destination channel cannot hold
    ///   external audio
    pub fn new(
        dest_dir: impl AsRef<Path>,
        base_uri: Url,
        channels: &ChannelRegistry,
        config: &PublishConfig,
    ) -> PublishResult<Self> {
        config.validate()?;
        channels.require(&config.source_channel)?;
        channels.check_accepts(&config.destination_channel, MediaKind::ExternalAudio)?;

        std::fs::create_dir_all(dest_dir.as_ref())?;
        let dest_dir = dest_dir.as_ref().canonicalize()?;

        Ok(Self {
            dest_dir,
            base_uri,
            source_channel: config.source_channel.clone(),
            destination_channel: config.destination_channel.clone(),
            config: config.clone(),
            next_index: config.first_file_index,
            current: None,
            files: Vec::new(),
        })
    }

    pub fn source_channel(&self) -> &str {
        &self.source_channel
    }

    pub fn destination_channel(&self) -> &str {
        &self.destination_channel
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Format of the open file, or `None` if no file is open.
    pub fn current_format(&self) -> Option<PcmFormat> {
        self.current.as_ref().map(|f| f.writer.format())
    }

    /// Payload bytes written to the open file.
    pub fn current_data_length(&self) -> u64 {
        self.current
            .as_ref()
            .map(|f| f.writer.data_length())
            .unwrap_or(0)
    }

    /// Files finalized so far.
    pub fn files(&self) -> &[PublishedFile] {
        &self.files
    }

    /// Closes the open file, if any; the next append opens a new one.
    pub fn start_new_file(&mut self) -> PublishResult<()> {
        self.close_current()
    }

    /// Appends the whole payload of `audio` to the open file.
    ///
    /// A new file is opened first if none is open or the open file's format
    /// differs from `audio`'s. Returns the clip position within that file.
    pub fn append(&mut self, audio: &AudioMediaData) -> PublishResult<AppendedClip> {
        let format = audio.format();
        if let Some(current) = self.current_format() {
            if !current.is_compatible_with(&format) {
                tracing::debug!(from = %current, to = %format, "format change, rolling over");
                self.close_current()?;
            }
        }
        let file = match self.current.take() {
            Some(open) => self.current.insert(open),
            None => {
                let open = self.open_file(format)?;
                self.current.insert(open)
            }
        };

        let clip_begin = file.writer.duration();
        let expected = audio.pcm_length();
        let copied = file.writer.append_from(&mut audio.open_pcm())?;
        if copied != expected {
            return Err(AudioError::TruncatedStream {
                expected,
                available: copied,
            }
            .into());
        }

        Ok(AppendedClip {
            file: file.name.clone(),
            src: file.src.clone(),
            clip_begin,
            clip_end: file.writer.duration(),
        })
    }

    /// Finalizes the open file and returns every published file.
    pub fn finish(mut self) -> PublishResult<Vec<PublishedFile>> {
        self.close_current()?;
        Ok(std::mem::take(&mut self.files))
    }

    fn open_file(&mut self, format: PcmFormat) -> PublishResult<OpenFile> {
        let index = self.next_index;
        let name = self.config.file_name(index);
        let path = self.dest_dir.join(&name);
        let src = relative_src(&self.base_uri, &path)?;

        let file = File::create(&path)?;
        let writer = WavStreamWriter::new(BufWriter::new(file), format)?;
        tracing::info!(file = %name, format = %format, "opened output file");

        self.next_index = index
            .checked_add(1)
            .ok_or_else(|| PublishError::invalid_config("output file index overflowed"))?;
        Ok(OpenFile {
            name,
            src,
            path,
            writer,
        })
    }

    fn close_current(&mut self) -> PublishResult<()> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };
        let format = open.writer.format();
        let data_length = open.writer.data_length();
        open.writer.finalize()?;

        let blake3 = read_back_hash(&open.path, data_length)?;
        let duration = format.duration_for_bytes(data_length);
        tracing::info!(
            file = %open.name,
            bytes = data_length,
            duration_ms = duration.as_millis() as u64,
            "finalized output file"
        );
        self.files.push(PublishedFile {
            name: open.name,
            src: open.src,
            path: open.path,
            format,
            data_length,
            duration,
            blake3,
        });
        Ok(())
    }
}

fn relative_src(base_uri: &Url, path: &Path) -> PublishResult<String> {
    let target = file_uri(path)?;
    Ok(base_uri
        .make_relative(&target)
        .unwrap_or_else(|| target.to_string()))
}

/// Re-reads a finalized file and hashes its payload.
fn read_back_hash(path: &Path, data_length: u64) -> PublishResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let info = PcmDataInfo::parse_header(&mut reader)?;
    if info.data_length as u64 != data_length {
        return Err(AudioError::malformed(format!(
            "{} declares {} payload bytes, {} were written",
            path.display(),
            info.data_length,
            data_length
        ))
        .into());
    }
    Ok(hash_pcm_stream(&mut reader, data_length)?)
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(talkbook_audio::time::as_millis_f64(*d))
}
