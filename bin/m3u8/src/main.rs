use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use iori_m3u8::{HasBaseUri, M3u8, M3u8Parser};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[clap(version, author)]
/// Parses, inspects and re-serializes HLS playlists.
pub struct M3u8Args {
    /// Fail on unexpected lines instead of skipping them
    #[clap(long, global = true)]
    strict: bool,

    /// Base uri to resolve relative uris against.
    ///
    /// Defaults to the directory of the input file.
    #[clap(long, global = true)]
    base_uri: Option<String>,

    /// Move every uri in the playlist under this path
    #[clap(long, global = true)]
    base_path: Option<String>,

    /// Debug output
    #[clap(long, alias = "debug", global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: M3u8Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum M3u8Command {
    /// Parse a playlist and write it back in canonical form
    Format {
        /// Playlist file. Reads from stdin if not specified.
        input: Option<PathBuf>,

        /// Output file. Writes to stdout if not specified.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a playlist
    Inspect {
        /// Playlist file. Reads from stdin if not specified.
        input: Option<PathBuf>,

        /// Print the parsed playlist as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the files a playlist refers to
    Files {
        /// Playlist file. Reads from stdin if not specified.
        input: Option<PathBuf>,

        /// Resolve uris against the base uri
        #[clap(short, long)]
        absolute: bool,
    },
}

impl M3u8Args {
    fn load(&self, input: Option<&Path>) -> anyhow::Result<M3u8> {
        let content = match input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                content
            }
        };

        let base_uri = self.base_uri.clone().or_else(|| {
            input
                .and_then(Path::parent)
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(|parent| parent.to_string_lossy().into_owned())
        });

        let mut parser = M3u8Parser::new().with_strict(self.strict);
        if let Some(base_uri) = base_uri {
            log::debug!("Resolving uris against {base_uri}");
            parser = parser.with_base_uri(base_uri);
        }
        if let Some(base_path) = &self.base_path {
            parser = parser.with_base_path(base_path.clone());
        }

        Ok(parser.parse(content.trim())?)
    }

    fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            M3u8Command::Format { input, output } => {
                let playlist = self.load(input.as_deref())?;
                match output {
                    Some(output) => playlist.dump(output)?,
                    None => println!("{}", playlist.dumps()),
                }
            }
            M3u8Command::Inspect { input, json } => {
                let playlist = self.load(input.as_deref())?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&playlist)?);
                } else {
                    print_summary(&playlist)?;
                }
            }
            M3u8Command::Files { input, absolute } => {
                let playlist = self.load(input.as_deref())?;
                for file in files(&playlist, *absolute)? {
                    println!("{file}");
                }
            }
        }
        Ok(())
    }
}

fn print_summary(playlist: &M3u8) -> anyhow::Result<()> {
    if playlist.is_variant {
        println!("Master playlist");
        for variant in &playlist.playlists {
            let info = &variant.stream_info;
            let resolution = info
                .resolution
                .map(|resolution| resolution.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>10} bps  {:>9}  {}",
                info.bandwidth.unwrap_or_default(),
                resolution,
                variant.uri
            );
            for media in playlist.playlist_media(variant) {
                println!(
                    "    {} {}",
                    media.media_type.as_deref().unwrap_or("MEDIA"),
                    media.name.as_deref().unwrap_or_default()
                );
            }
        }
        for iframe in &playlist.iframe_playlists {
            println!(
                "  I-frames {:>10} bps  {}",
                iframe.iframe_stream_info.bandwidth.unwrap_or_default(),
                iframe.uri.as_deref().unwrap_or_default()
            );
        }
        return Ok(());
    }

    let duration: f64 = playlist.segments.iter().map(|s| s.duration).sum();
    println!("Media playlist");
    println!("  Segments:        {}", playlist.segments.len());
    println!("  Duration:        {duration:.3}s");
    if let Some(target_duration) = playlist.target_duration {
        println!("  Target duration: {target_duration}s");
    }
    if let Some(media_sequence) = playlist.media_sequence {
        println!("  Media sequence:  {media_sequence}");
    }
    if let Some(program_date_time) = playlist.program_date_time {
        println!("  Program date:    {program_date_time}");
    }
    println!("  Ended:           {}", playlist.is_endlist);

    for (index, key) in playlist.keys.iter().enumerate() {
        let segments = playlist.segments_by_key(key.as_ref().map(|_| index)).count();
        match key {
            Some(key) => println!(
                "  Key {}: {} ({segments} segments)",
                key.method,
                key.absolute_uri()?.unwrap_or_default()
            ),
            None => println!("  Unencrypted: {segments} segments"),
        }
    }
    Ok(())
}

fn files(playlist: &M3u8, absolute: bool) -> anyhow::Result<Vec<String>> {
    let uri = |entity: &dyn HasBaseUri| -> anyhow::Result<Option<String>> {
        if absolute {
            Ok(entity.absolute_uri()?)
        } else {
            Ok(entity.uri().map(str::to_string))
        }
    };

    let mut files = Vec::new();
    if playlist.is_variant {
        for media in &playlist.media {
            files.extend(uri(media)?);
        }
        for variant in &playlist.playlists {
            files.extend(uri(variant)?);
        }
        for iframe in &playlist.iframe_playlists {
            files.extend(uri(iframe)?);
        }
        return Ok(files);
    }

    for key in playlist.keys.iter().flatten() {
        if let Some(key) = uri(key)? {
            if !files.contains(&key) {
                files.push(key);
            }
        }
    }
    for segment in &playlist.segments {
        files.extend(uri(segment)?);
    }
    Ok(files)
}

fn main() -> anyhow::Result<()> {
    let args = M3u8Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    args.run()
}
