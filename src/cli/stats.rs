use tabled::Table;

use crate::{
    analysis, config::Settings, error, info, management::UserStore, types::CountTableRow,
};

/// Prints the genre, artist, album and release-year distributions of the
/// stored datasets of `user_id`, `top` lines each.
pub async fn stats(settings: Settings, user_id: &str, top: usize) {
    let store = UserStore::new(&settings.data_dir, user_id);
    let rows = match analysis::load_user_data(&store).await {
        Ok(rows) => rows,
        Err(e) => error!("Cannot load datasets of {}. Err: {}", user_id, e),
    };
    info!("{} rows with genres and playcounts", rows.len());

    print_table("Genres", analysis::genre_distribution(&rows), top);
    print_table("Artists", analysis::artist_distribution(&rows, top), top);
    print_table("Albums", analysis::album_distribution(&rows, top), top);

    let mut years = analysis::year_distribution(&rows);
    years.sort_by(|a, b| b.1.cmp(&a.1));
    print_table(
        "Release years",
        years.into_iter().map(|(y, c)| (y.to_string(), c)).collect(),
        top,
    );

    match analysis::playcount_stats(&rows) {
        Some(s) => info!(
            "Listeners per artist: mean {:.0}, max {}, min {}",
            s.mean, s.max, s.min
        ),
        None => info!("No listener counts yet."),
    }
}

fn print_table(title: &str, counts: Vec<(String, usize)>, top: usize) {
    let table_rows: Vec<CountTableRow> = counts
        .into_iter()
        .take(top)
        .map(|(value, count)| CountTableRow { value, count })
        .collect();

    println!("\n{}", title);
    println!("{}", Table::new(table_rows));
}
