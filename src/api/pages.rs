//! HTML for the dashboard page and its fragments.

use serde_json::Value;

use crate::{
    types::{DashboardTrack, UserDetails},
    utils::escape_html,
};

/// Which fragment the page shows first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultView {
    Home,
    Tracks,
}

impl DefaultView {
    fn path(&self) -> &'static str {
        match self {
            DefaultView::Home => "/home",
            DefaultView::Tracks => "/tracks",
        }
    }
}

const STYLE: &str = r#"
body { margin: 0; font-family: Helvetica, Arial, sans-serif; background: #E4EBF5; color: #474e5f; }
nav { display: flex; gap: 1rem; align-items: center; padding: 1rem 2rem; background: #ffffff; }
nav a, nav button { color: #474e5f; text-decoration: none; background: none; border: 0; cursor: pointer; font-size: 1rem; }
nav .spacer { flex: 1; }
main { padding: 2rem; }
.tracks { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
.track { background: #ffffff; border-radius: 12px; padding: 1rem; }
.track img { width: 64px; height: 64px; border-radius: 8px; float: left; margin-right: .75rem; }
.genres span { display: inline-block; font-size: .75rem; background: #6d5dfc; color: #ffffff; border-radius: 6px; padding: 0 .4rem; margin: .1rem; }
.similar { clear: both; font-size: .8rem; margin-top: .5rem; }
.plots img, .plots iframe { width: 100%; max-width: 600px; border: 0; }
.plots iframe { height: 600px; }
"#;

const SCRIPT: &str = r##"
async function show(path) {
  const res = await fetch(path);
  document.getElementById("content").innerHTML = await res.text();
  if (path === "/insights") { renderBarCharts(); }
}
async function startSync() {
  const res = await fetch("/sync", { method: "POST" });
  const body = await res.json();
  alert(body.message);
}
async function renderBarCharts() {
  const data = await (await fetch("/user_plot_data")).json();
  const charts = [
    ["genresBarChart", "wordcloud_genres", "top_genres"],
    ["artistsBarChart", "wordcloud_artists", "top_artists"],
    ["playcountBarChart", "playcount_distribution", "top_playlists"],
  ];
  for (const [canvasId, plot, key] of charts) {
    const canvas = document.getElementById(canvasId);
    if (!canvas || !data[plot] || !data[plot][key]) { continue; }
    const dataset = data[plot][key];
    new Chart(canvas.getContext("2d"), {
      type: "bar",
      data: { labels: Object.keys(dataset), datasets: [{ data: Object.values(dataset), backgroundColor: "#1DB954" }] },
      options: { plugins: { legend: { display: false } } },
    });
  }
}
"##;

/// The full dashboard page. Fragments are fetched into `#content`.
pub fn dashboard_page(user: Option<&UserDetails>, default_view: DefaultView) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<button onclick="startSync()">Sync</button><span>{}</span><a href="/logout">Log out</a>"#,
            escape_html(display_name(user))
        ),
        None => r#"<a href="/login">Log in with Spotify</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>listenlens</title>
<style>{style}</style>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
<nav>
  <button onclick="show('/home')">Home</button>
  <button onclick="show('/tracks')">Tracks</button>
  <button onclick="show('/profile')">Profile</button>
  <button onclick="show('/insights')">Insights</button>
  <span class="spacer"></span>
  {account}
</nav>
<main id="content"></main>
<script>{script}
show("{default_path}");
</script>
</body>
</html>
"#,
        style = STYLE,
        script = SCRIPT,
        account = account,
        default_path = default_view.path(),
    )
}

pub fn home_fragment(user: Option<&UserDetails>) -> String {
    match user {
        Some(user) => format!(
            "<section><h1>Welcome back, {}</h1><p>Browse your top and recent tracks, your profile and the insights drawn from your playlists.</p></section>",
            escape_html(display_name(user))
        ),
        None => r#"<section>
<h1>Your listening, mapped</h1>
<p>Log in with Spotify to see your top and recent tracks with their genres and similar songs.</p>
<p><a href="/login">Log in with Spotify</a></p>
<h2>Request access</h2>
<form method="post" action="/register">
  <input type="email" name="email" placeholder="Spotify account email" required>
  <input type="text" name="username" placeholder="Name" required>
  <button type="submit">Request access</button>
</form>
</section>"#
            .to_string(),
    }
}

pub fn tracks_fragment(top_tracks: &[DashboardTrack], recent_tracks: &[DashboardTrack]) -> String {
    if top_tracks.is_empty() && recent_tracks.is_empty() {
        return "<section><p>No tracks to show yet.</p></section>".to_string();
    }

    format!(
        r#"<section><h2>Top tracks</h2><div class="tracks">{}</div><h2>Recently played</h2><div class="tracks">{}</div></section>"#,
        track_cards(top_tracks),
        track_cards(recent_tracks)
    )
}

fn track_cards(tracks: &[DashboardTrack]) -> String {
    tracks.iter().map(track_card).collect()
}

fn track_card(track: &DashboardTrack) -> String {
    let rank = track
        .rank
        .map(|r| format!("<strong>#{}</strong> ", r))
        .unwrap_or_default();
    let genres: String = track
        .genre
        .iter()
        .map(|g| format!("<span>{}</span>", escape_html(g)))
        .collect();
    let similar = if track.similar_songs.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = track
            .similar_songs
            .iter()
            .map(|s| format!("{} by {}", escape_html(&s.name), escape_html(&s.artist)))
            .collect();
        format!(r#"<div class="similar">Similar: {}</div>"#, items.join(", "))
    };

    format!(
        r#"<div class="track"><img src="{img}" alt=""><div>{rank}<a href="{url}" target="_blank">{name}</a></div><div><a href="{artist_url}" target="_blank">{artist}</a></div><div><a href="{album_url}" target="_blank">{album}</a></div><div class="genres">{genres}</div>{similar}</div>"#,
        img = escape_html(&track.img),
        rank = rank,
        url = escape_html(&track.url),
        name = escape_html(&track.name),
        artist_url = escape_html(&track.artist_url),
        artist = escape_html(&track.artist),
        album_url = escape_html(&track.album_url),
        album = escape_html(&track.album),
        genres = genres,
        similar = similar,
    )
}

pub fn profile_fragment(user: Option<&UserDetails>) -> String {
    let Some(user) = user else {
        return r#"<section><p><a href="/login">Log in</a> to see your profile.</p></section>"#
            .to_string();
    };

    let optional = |v: &Option<String>| escape_html(v.as_deref().unwrap_or("-"));
    let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());

    format!(
        r#"<section class="profile">
<img src="{img}" alt="" width="120">
<h1><a href="{link}" target="_blank">{name}</a></h1>
<table>
<tr><td>Email</td><td>{email}</td></tr>
<tr><td>Country</td><td>{country}</td></tr>
<tr><td>Plan</td><td>{product}</td></tr>
<tr><td>Followers</td><td>{followers}</td></tr>
<tr><td>Playlists</td><td>{playlists}</td></tr>
<tr><td>Tracks in playlists</td><td>{playlist_tracks}</td></tr>
<tr><td>Liked songs</td><td>{liked}</td></tr>
</table>
</section>"#,
        img = escape_html(&user.img),
        link = escape_html(&user.spotify_link),
        name = escape_html(display_name(user)),
        email = optional(&user.email),
        country = optional(&user.country),
        product = optional(&user.product),
        followers = count(user.followers),
        playlists = user.total_playlists,
        playlist_tracks = user.total_playlist_tracks,
        liked = count(user.liked_songs),
    )
}

/// Generated charts with their summaries. `plots` lists the file names that
/// exist in the user's plots directory.
pub fn insights_fragment(user: Option<&UserDetails>, notes: &Value, plots: &[String]) -> String {
    if user.is_none() {
        return r#"<section><p><a href="/login">Log in</a> to see your insights.</p></section>"#
            .to_string();
    }
    if plots.is_empty() {
        return r#"<section><p>No insights yet. Press <strong>Sync</strong> to pull your playlists and draw the charts.</p></section>"#
            .to_string();
    }

    let summary = |plot: &str| {
        notes
            .get(plot)
            .and_then(|n| n.get("summary"))
            .and_then(Value::as_str)
            .map(|s| format!("<p>{}</p>", escape_html(s)))
            .unwrap_or_default()
    };

    let mut body = String::from(r#"<section class="plots">"#);
    let blocks = [
        ("wordcloud_genres", "wordcloud_genres.svg", "Genres", Some("genresBarChart")),
        ("wordcloud_artists", "wordcloud_artists.svg", "Artists", Some("artistsBarChart")),
        (
            "playcount_distribution",
            "playcount_distribution.svg",
            "Popularity by playlist",
            Some("playcountBarChart"),
        ),
        ("polar_playcount_playlist", "polar_playcount_playlist.svg", "Popularity by release year", None),
    ];
    for (plot, file, title, bar_chart) in blocks {
        if !plots.iter().any(|p| p == file) {
            continue;
        }
        body.push_str(&format!(
            r#"<article><h2>{}</h2>{}<img src="/plots/{}" alt="{}">"#,
            title,
            summary(plot),
            file,
            title
        ));
        if let Some(canvas) = bar_chart {
            body.push_str(&format!(r#"<canvas id="{}"></canvas>"#, canvas));
        }
        body.push_str("</article>");
    }
    if plots.iter().any(|p| p == "network.html") {
        body.push_str(&format!(
            r#"<article><h2>Artists, genres and playlists</h2>{}<iframe src="/plots/network.html"></iframe></article>"#,
            summary("artist_genre_playlist_network")
        ));
    }
    body.push_str("</section>");
    body
}

pub fn registered_fragment(username: &str) -> String {
    format!(
        "<section><h1>Thanks, {}!</h1><p>Your access request was recorded.</p><p><a href=\"/\">Back</a></p></section>",
        escape_html(username)
    )
}

/// A small standalone page for failures.
pub fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>listenlens</title></head><body><h4>{}</h4><p><a href=\"/\">Back</a></p></body></html>",
        escape_html(message)
    )
}

fn display_name(user: &UserDetails) -> &str {
    user.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&user.id)
}
