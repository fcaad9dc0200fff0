use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    analysis::{artist_distribution, genre_distribution, playlist_distribution},
    error::{PlotError, StoreError},
    types::TrackRecord,
};

use super::Plot;

const TOP_ARTISTS: usize = 30;
const TOP_GENRES: usize = 20;
const TOP_PLAYLISTS: usize = 5;
const VIS_NETWORK_JS: &str = "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub shape: &'static str,
    pub mass: u8,
    pub color: &'static str,
    pub font: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub title: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn node(
    kind: &str,
    label: &str,
    shape: &'static str,
    mass: u8,
    color: &'static str,
    font_color: &str,
) -> GraphNode {
    GraphNode {
        id: format!("{}:{}", kind, label),
        label: label.to_string(),
        title: format!("{}: {}", capitalize(kind), label),
        shape,
        mass,
        color,
        font: json!({ "color": font_color, "size": 18, "face": "helvetica" }),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Nodes for the top 30 artists, top 20 genres and top 5 playlists, with
/// artist↔genre and genre↔playlist edges drawn from the rows whose artist
/// and playlist are both on top.
///
/// Node ids carry their kind (`artist:`, `genre:`, `playlist:`) so an artist
/// and a genre of the same name stay apart. Edges are undirected and
/// deduplicated.
pub fn build_graph(rows: &[TrackRecord]) -> Graph {
    let artists: Vec<String> = artist_distribution(rows, TOP_ARTISTS)
        .into_iter()
        .map(|(a, _)| a)
        .collect();
    let genres: Vec<String> = genre_distribution(rows)
        .into_iter()
        .take(TOP_GENRES)
        .map(|(g, _)| g)
        .collect();
    let playlists: Vec<String> = playlist_distribution(rows)
        .into_iter()
        .take(TOP_PLAYLISTS)
        .map(|(p, _)| p)
        .collect();

    let mut graph = Graph::default();
    for artist in &artists {
        graph
            .nodes
            .push(node("artist", artist, "dot", 1, "#4bd183", "#636363"));
    }
    for genre in &genres {
        graph
            .nodes
            .push(node("genre", genre, "circle", 2, "#6d5dfc", "#E4EBF5"));
    }
    for playlist in &playlists {
        graph
            .nodes
            .push(node("playlist", playlist, "circle", 3, "#ff4400", "#ffffff"));
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut add_edge = |graph: &mut Graph,
                        from: String,
                        to: String,
                        title: &'static str,
                        color: &'static str| {
        let key = if from <= to {
            (from.clone(), to.clone())
        } else {
            (to.clone(), from.clone())
        };
        if seen.insert(key) {
            graph.edges.push(GraphEdge {
                from,
                to,
                title,
                color,
            });
        }
    };

    for row in rows {
        if !artists.contains(&row.artist) || !playlists.contains(&row.playlist) {
            continue;
        }
        for genre in row.genres.iter().filter(|g| genres.contains(g)) {
            add_edge(
                &mut graph,
                format!("artist:{}", row.artist),
                format!("genre:{}", genre),
                "Artist ↔ Genre",
                "#4D4D4D50",
            );
            add_edge(
                &mut graph,
                format!("genre:{}", genre),
                format!("playlist:{}", row.playlist),
                "Genre ↔ Playlist",
                "#88888850",
            );
        }
    }

    graph
}

/// The network graph as a standalone HTML page.
pub fn artist_genre_playlist_network(rows: &[TrackRecord]) -> Result<Plot, PlotError> {
    let graph = build_graph(rows);
    if graph.nodes.is_empty() {
        return Err(PlotError::Empty("artist_genre_playlist_network"));
    }

    let first_labels = |prefix: &str| -> Vec<String> {
        graph
            .nodes
            .iter()
            .filter(|n| n.id.starts_with(prefix))
            .take(5)
            .map(|n| n.label.clone())
            .collect()
    };
    let explanation = json!({
        "summary": "Network shows strongest links between top artists, genres, and playlists.",
        "top_artists": first_labels("artist:"),
        "top_genres": first_labels("genre:"),
        "top_playlists": first_labels("playlist:"),
    });

    Ok(Plot {
        name: "artist_genre_playlist_network",
        file_name: "network.html",
        content: render_html(&graph)?,
        explanation,
    })
}

fn render_html(graph: &Graph) -> Result<String, PlotError> {
    let nodes = serde_json::to_string(&graph.nodes).map_err(StoreError::from)?;
    let edges = serde_json::to_string(&graph.edges).map_err(StoreError::from)?;
    let options = json!({
        "physics": {
            "solver": "forceAtlas2Based",
            "forceAtlas2Based": {
                "gravitationalConstant": -50,
                "centralGravity": 0.01,
                "springLength": 100,
                "springConstant": 0.08
            },
            "stabilization": { "iterations": 200 }
        },
        "edges": { "smooth": { "type": "straightCross" } },
        "interaction": { "hover": true }
    });

    // `</` must not close the script tag early
    let script_safe = |s: String| s.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Artists, genres and playlists</title>
<script src="{js}"></script>
<style>
  html, body {{ margin: 0; height: 100%; background: transparent; }}
  #network {{ width: 100%; height: 100vh; background: transparent; }}
</style>
</head>
<body style="background:transparent;">
<div id="network"></div>
<script>
  const nodes = new vis.DataSet({nodes});
  const edges = new vis.DataSet({edges});
  const container = document.getElementById("network");
  new vis.Network(container, {{ nodes: nodes, edges: edges }}, {options});
</script>
</body>
</html>
"#,
        js = VIS_NETWORK_JS,
        nodes = script_safe(nodes),
        edges = script_safe(edges),
        options = options,
    ))
}
