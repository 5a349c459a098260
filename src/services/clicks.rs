//! Click counting and per-click logs.

use rusqlite::params;

use super::helpers::map_click_log_row;
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::ClickLog;
use crate::queries::{ClickLogs, Links};

/// Bump the click counter for a resolved link.
///
/// Concurrent visitors race on this counter only inside SQLite, which
/// serializes the UPDATE; callers treat failure as non-fatal.
pub fn increment_clicks(pool: &DbPool, link_id: i64) -> Result<(), AppError> {
    let conn = get_conn(pool)?;
    conn.execute(Links::INCREMENT_CLICKS, params![link_id])?;
    Ok(())
}

/// Record visitor details for a resolution; gated on configuration.
pub fn record_click(
    pool: &DbPool,
    link_id: i64,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
    referer: Option<&str>,
) -> Result<(), AppError> {
    let conn = get_conn(pool)?;

    conn.execute(
        ClickLogs::INSERT,
        params![link_id, ip_address, user_agent, referer],
    )?;

    Ok(())
}

/// Get recent click logs for a link
pub fn get_click_logs(pool: &DbPool, link_id: i64, limit: u32) -> Result<Vec<ClickLog>, AppError> {
    let conn = get_conn(pool)?;
    let mut stmt = conn.prepare(ClickLogs::SELECT_BY_LINK_ID)?;

    let logs = stmt
        .query_map(params![link_id, limit], map_click_log_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(logs)
}
