//! Read-only video browsing handlers.

use clap::Subcommand;
use vtrack_db::{DbError, Store, VideoSummaryRow};

use crate::fmt::{fmt_date, fmt_pct, fmt_text};

/// Sub-commands available under `videos`.
#[derive(Debug, Subcommand)]
pub enum VideosCommands {
    /// List every tracked video, most recently published first
    List,
    /// Search descriptions, IDs, creators, and products
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },
    /// Show lifetime totals and the latest scores of one video
    Show { video_id: String },
}

/// # Errors
///
/// Returns an error if the database query fails or, for `show`, if the
/// video is not tracked.
pub(crate) async fn run_videos(store: &mut Store, command: VideosCommands) -> anyhow::Result<()> {
    let pool = store.pool().await?;
    match command {
        VideosCommands::List => {
            let videos = vtrack_db::list_videos(pool).await?;
            if videos.is_empty() {
                println!("no videos found; run `ingest` first");
                return Ok(());
            }
            print_summaries(&videos);
        }
        VideosCommands::Search { query } => {
            let videos = vtrack_db::search_videos(pool, &query).await?;
            if videos.is_empty() {
                println!("no videos match '{query}'");
                return Ok(());
            }
            print_summaries(&videos);
        }
        VideosCommands::Show { video_id } => {
            let video = match vtrack_db::get_video_details(pool, &video_id).await {
                Ok(video) => video,
                Err(DbError::NotFound) => {
                    anyhow::bail!("video '{video_id}' not found; run `videos search` to look it up")
                }
                Err(e) => return Err(e.into()),
            };

            println!("Video: {}", video.video_id);
            println!("Creator: {}", fmt_text(video.creator_name.as_deref(), 80));
            println!("Published: {}", fmt_text(video.publish_time.as_deref(), 40));
            println!("Description: {}", fmt_text(video.video_info.as_deref(), 200));
            println!("Products: {}", fmt_text(video.products.as_deref(), 200));
            println!();
            println!("Days tracked: {}", video.days_tracked);
            println!("Latest day: {}", fmt_date(video.latest_performance_date));
            println!("Views: {}", video.total_vv);
            println!("Likes: {}", video.total_likes);
            println!("Comments: {}", video.total_comments);
            println!("Shares: {}", video.total_shares);
            println!("New followers: {}", video.total_new_followers);
            println!("Orders: {}", video.total_orders);
            println!("Revenue: ${:.2}", video.total_video_revenue);
            println!();
            println!("DGR: {:.2}%", video.dgr);
            println!("EGR: {:.2}%", video.egr);
            println!("Momentum: {:.2}%", video.momentum);
            println!("Trending score: {:.4}", video.trending_score);
        }
    }
    Ok(())
}

fn print_summaries(videos: &[VideoSummaryRow]) {
    println!(
        "{:<22}{:<20}{:<18}{:>12}{:>10}{:>13}  DESCRIPTION",
        "VIDEO", "CREATOR", "PUBLISHED", "VIEWS", "SHARES", "REVENUE"
    );
    for video in videos {
        println!(
            "{:<22}{:<20}{:<18}{:>12}{:>10}{:>13.2}  {}",
            video.video_id,
            fmt_text(video.creator_name.as_deref(), 17),
            fmt_text(video.publish_time.as_deref(), 16),
            video.total_vv,
            video.total_shares,
            video.total_video_revenue,
            fmt_text(video.video_info.as_deref(), 50),
        );
    }
}

/// Rank the videos of one day by views. Defaults to the latest stored day.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_top(
    store: &mut Store,
    date: Option<chrono::NaiveDate>,
) -> anyhow::Result<()> {
    let pool = store.pool().await?;
    let date = match date {
        Some(date) => date,
        None => match vtrack_db::latest_performance_date(pool).await? {
            Some(date) => date,
            None => {
                println!("no performance data found; run `ingest` first");
                return Ok(());
            }
        },
    };

    let rows = vtrack_db::top_videos_for_date(pool, date).await?;
    if rows.is_empty() {
        println!("no videos stored for {date}");
        return Ok(());
    }

    println!("Top videos for {date}");
    println!(
        "{:<5}{:<22}{:<20}{:>12}{:>10}{:>9}{:>13}{:>9}{:>9}{:>9}{:>9}",
        "RANK", "VIDEO", "CREATOR", "VIEWS", "COMMENTS", "SHARES", "REVENUE", "CTR", "CTOR",
        "FINISH", "SCORE"
    );
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "{:<5}{:<22}{:<20}{:>12}{:>10}{:>9}{:>13.2}{:>9}{:>9}{:>9}{:>9.3}",
            rank + 1,
            row.video_id,
            fmt_text(row.creator_name.as_deref(), 17),
            row.vv,
            row.comments,
            row.shares,
            row.video_revenue,
            fmt_pct(row.ctr),
            fmt_pct(row.ctor),
            fmt_pct(row.video_finish_rate),
            row.trending_score,
        );
    }
    Ok(())
}
