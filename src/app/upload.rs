use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use url::Url;

use crate::app::{Call, Command};
use crate::domain::upload::FileInfo;
use crate::error::{ClientError, ClientResult};
use crate::state::{UploadResult, ViewState};

/// Split text pasted by a terminal drop into paths. Terminals quote
/// (`'a b.pdf'`), backslash-escape (`a\ b.pdf`) or send `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => cur.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !cur.is_empty() {
                    tokens.push(std::mem::take(&mut cur));
                }
            }
            (None, c) => cur.push(c),
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }

    tokens
        .into_iter()
        .filter_map(|t| {
            if t.starts_with("file://") {
                Url::parse(&t).ok()?.to_file_path().ok()
            } else {
                Some(PathBuf::from(t))
            }
        })
        .collect()
}

/// Start uploading the first of `paths`. Filename and busy indicator show
/// before the request resolves.
pub fn select_files(state: &mut ViewState, paths: Vec<PathBuf>) -> ClientResult<Vec<Command>> {
    let mut paths = paths.into_iter();
    let Some(path) = paths.next() else {
        return Err(ClientError::Validation("Please choose a file to upload".into()));
    };
    let extra = paths.count();
    if extra > 0 {
        debug!("ignoring {extra} additional dropped file(s)");
    }
    if state.upload.in_flight {
        return Err(ClientError::Validation(format!(
            "Still analysing {}; try {} again when it finishes",
            state.upload.filename.as_deref().unwrap_or("the previous file"),
            path.display()
        )));
    }

    let pane = &mut state.upload;
    pane.error = None;
    pane.generation += 1;
    pane.filename = Some(
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    );
    pane.busy = true;
    pane.in_flight = true;
    pane.result = UploadResult::None;
    state.modals.upload = false;

    Ok(vec![Command::Call(Call::UploadFile {
        generation: pane.generation,
        path,
    })])
}

pub fn uploaded(
    state: &mut ViewState,
    generation: u64,
    result: ClientResult<FileInfo>,
    settle: Duration,
) -> Vec<Command> {
    let pane = &mut state.upload;
    if generation != pane.generation {
        debug!("discarding stale upload result (generation {generation})");
        return vec![];
    }
    pane.in_flight = false;
    pane.result = match result {
        Ok(info) => UploadResult::Analysed(info),
        Err(e) => {
            warn!("upload failed: {e}");
            UploadResult::Failed(e.to_string())
        }
    };
    pane.path_input.clear();
    vec![Command::SettleUpload {
        generation,
        after: settle,
    }]
}

/// The busy indicator lingers until the settle timer of the same upload fires.
pub fn settled(state: &mut ViewState, generation: u64) {
    let pane = &mut state.upload;
    if generation == pane.generation && !pane.in_flight {
        pane.busy = false;
    }
}
