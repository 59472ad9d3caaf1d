//! `cuefind`: search the spoken content of a channel's transcripts.
//!
//! Usage:
//!   cuefind index <channel>
//!   cuefind search <channel> <query> [--json] [--limit N]
//!
//! `<channel>` is a folder under `data.subtitles_dir` holding
//! `<video-id>.<lang>.json` cue files. The index is kept next to them.

use std::env;
use std::path::{Path, PathBuf};
use std::process::exit;

use cuefind_core::config::{resolve_with_base, Config, Settings};
use cuefind_core::corpus::CorpusLoader;
use cuefind_core::traits::TranscriptSink;
use cuefind_core::{ScoredSegment, TranscriptSearch};
use cuefind_text::{index_dir, TranscriptIndex};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cuefind index <channel>\n       cuefind search <channel> <query> [--json] [--limit N]";

fn perhaps_exit<T>(result: anyhow::Result<T>, code: i32) -> T {
    match result {
        Ok(v) => v,
        Err(e) => { eprintln!("{e:#}"); exit(code) }
    }
}

fn usage() -> ! {
    eprintln!("{USAGE}\n\n<channel> must be a folder of <video-id>.<lang>.json cue files.");
    exit(6)
}

fn channel_folder(settings: &Settings, channel: &str) -> PathBuf {
    let folder = resolve_with_base(&settings.data.subtitles_root(), channel);
    match std::fs::metadata(&folder) {
        Err(e) => { eprintln!("{}: {}", folder.display(), e); exit(1) }
        Ok(info) if !info.is_dir() => { eprintln!("{} is not a dir.", folder.display()); exit(2) }
        Ok(_) => folder,
    }
}

fn build_index(settings: &Settings, folder: &Path, index: &TranscriptIndex) -> anyhow::Result<usize> {
    let loader = CorpusLoader::new(settings.data.lang.clone(), settings.encoder.encoder()?);
    let documents = loader.load_dir(folder)?;
    index.add_transcripts(&documents)
}

fn deep_link(video_url_base: &str, segment: &ScoredSegment) -> String {
    format!("{}?v={}&t={}s", video_url_base, segment.document_id, segment.start_time.as_secs())
}

fn render_line(video_url_base: &str, segment: &ScoredSegment) -> String {
    format!("{} ([{}], score={:.3})", deep_link(video_url_base, segment), segment.sorted_terms.join(" "), segment.score)
}

fn run_index(settings: &Settings, args: &[String]) {
    let [channel] = args else { usage() };
    let folder = channel_folder(settings, channel);
    let dir = index_dir(&folder, &settings.data.lang);
    let index = perhaps_exit(TranscriptIndex::create(&dir, &settings.data.lang), 3);
    let count = perhaps_exit(build_index(settings, &folder, &index), 3);
    println!("Indexed {} transcripts into {}", count, dir.display());
}

#[derive(Debug, PartialEq)]
struct SearchArgs {
    channel: String,
    query: String,
    json: bool,
    limit: usize,
}

fn parse_search_args(args: &[String], default_limit: usize) -> Result<SearchArgs, String> {
    let mut positional = Vec::new();
    let mut json = false;
    let mut limit = default_limit;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => json = true,
            "--limit" => {
                limit = args.get(i + 1).and_then(|s| s.parse::<usize>().ok()).ok_or("--limit requires a number")?;
                i += 1;
            }
            s if s.starts_with("--") => return Err(format!("Unknown flag: {s}")),
            s => positional.push(s.to_string()),
        }
        i += 1;
    }
    if limit == 0 {
        return Err("limit must be greater than 0".to_string());
    }
    let [channel, query]: [String; 2] = positional.try_into().map_err(|_| "expected <channel> <query>".to_string())?;
    Ok(SearchArgs { channel, query, json, limit })
}

fn run_search(settings: &Settings, args: &[String]) {
    let SearchArgs { channel, query, json, limit } = match parse_search_args(args, settings.search.limit) {
        Ok(parsed) => parsed,
        Err(e) => { eprintln!("{e}"); usage() }
    };

    let folder = channel_folder(settings, &channel);
    let dir = index_dir(&folder, &settings.data.lang);
    let (index, created) = perhaps_exit(TranscriptIndex::open_or_create(&dir, &settings.data.lang), 3);
    if created {
        let count = perhaps_exit(build_index(settings, &folder, &index), 3);
        info!(count, dir = %dir.display(), "built missing index");
    }

    let search = TranscriptSearch::new(index).scoring(settings.ranking.scoring).limit(limit);
    let raw = perhaps_exit(search.fetch(&query), 4);
    let segments = perhaps_exit(search.resolve(&raw).map_err(anyhow::Error::from), 5);

    if json {
        println!("{}", perhaps_exit(serde_json::to_string(&segments).map_err(anyhow::Error::from), 6));
    } else {
        for segment in &segments {
            println!("{}", render_line(&settings.search.video_url_base, segment));
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let settings = perhaps_exit(Config::load().and_then(|c| c.settings()), 6);
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { usage() }
    let cmd = args.remove(0);
    match cmd.as_str() {
        "index" => run_index(&settings, &args),
        "search" => run_search(&settings, &args),
        _ => { eprintln!("Unknown command: {cmd}"); usage() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn renders_deep_link_with_whole_seconds() {
        let segment = ScoredSegment {
            document_id: "abc123".into(),
            start_time: Duration::from_millis(65_900),
            end_time: Duration::from_secs(70),
            sorted_terms: vec!["caesar".into(), "rome".into()],
            score: 4.0,
        };
        assert_eq!(
            render_line("https://www.youtube.com/watch", &segment),
            "https://www.youtube.com/watch?v=abc123&t=65s ([caesar rome], score=4.000)"
        );
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn search_args_accept_flags_anywhere() {
        let parsed = parse_search_args(&args(&["--json", "chan", "--limit", "7", "rome caesar"]), 50).expect("parse");
        assert_eq!(parsed, SearchArgs { channel: "chan".into(), query: "rome caesar".into(), json: true, limit: 7 });

        let defaults = parse_search_args(&args(&["chan", "rome"]), 50).expect("parse");
        assert!(!defaults.json);
        assert_eq!(defaults.limit, 50);
    }

    #[test]
    fn search_args_reject_bad_input() {
        assert!(parse_search_args(&args(&["chan", "rome", "--verbose"]), 50).is_err());
        assert!(parse_search_args(&args(&["chan", "rome", "--limit"]), 50).is_err());
        assert!(parse_search_args(&args(&["chan", "rome", "--limit", "many"]), 50).is_err());
        assert!(parse_search_args(&args(&["chan"]), 50).is_err());
        assert!(parse_search_args(&args(&["chan", "rome", "extra"]), 50).is_err());
    }

    #[test]
    fn search_args_reject_zero_limit() {
        assert!(parse_search_args(&args(&["chan", "rome", "--limit", "0"]), 50).is_err());
        assert!(parse_search_args(&args(&["chan", "rome"]), 0).is_err());
    }
}
