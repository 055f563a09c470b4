//! Display metadata for curated playlists.

use super::clustering::ClusteringMethod;
use super::models::{Cluster, Track};
use super::prompt_analyzer::extract_genres;
use serde::Serialize;
use std::collections::HashMap;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 300;

const ELLIPSIS: &str = "...";

/// Name and description for a playlist about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistMetadata {
    pub name: String,
    pub description: String,
}

/// Name a prompt-driven selection.
///
/// `"{Genre} & {Genre} Mix: {prompt}"` when the prompt implies genres,
/// `"Curated: {prompt}"` otherwise. `_selected` is unused for now.
pub fn name(_selected: &[Track], prompt: &str) -> PlaylistMetadata {
    let prompt = prompt.trim();
    let genres = extract_genres(prompt);

    let name = match genres.as_slice() {
        [] => format!("Curated: {}", truncate(prompt, 40)),
        [only] => format!("{} Mix: {}", title_case(only), truncate(prompt, 30)),
        [first, second, ..] => format!(
            "{} & {} Mix: {}",
            title_case(first),
            title_case(second),
            truncate(prompt, 30)
        ),
    };

    PlaylistMetadata {
        name: truncate_with_ellipsis(&name, MAX_NAME_CHARS),
        description: truncate_with_ellipsis(
            &format!("Curated for \"{}\"", prompt),
            MAX_DESCRIPTION_CHARS,
        ),
    }
}

/// Name the `index`-th cluster (0-based) after its most frequent
/// first-listed artist.
pub fn cluster_metadata(
    index: usize,
    cluster: &Cluster<'_>,
    method: ClusteringMethod,
) -> PlaylistMetadata {
    let name = match dominant_artist(cluster) {
        Some(artist) => format!("Cluster {}: {}", index + 1, artist),
        None => format!("Cluster {}", index + 1),
    };

    PlaylistMetadata {
        name: truncate_with_ellipsis(&name, MAX_NAME_CHARS),
        description: format!("{} tracks grouped by {}", cluster.len(), method),
    }
}

/// Most frequent first-artist name; ties go to the artist seen first.
fn dominant_artist<'a>(cluster: &Cluster<'a>) -> Option<&'a str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, &track) in cluster.tracks.iter().enumerate() {
        if let Some(artist) = track.first_artist_name() {
            counts.entry(artist).or_insert((0, position)).0 += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(artist, _)| artist)
}

/// Keep the first `max_chars` characters.
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Cut to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut cut: String = s.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

fn title_case(genre: &str) -> String {
    genre
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
