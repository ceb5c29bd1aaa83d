//! Menu/page link maintenance shared by the page and menu adapters.
//!
//! Every helper runs on a connection inside the caller's transaction.
//! Lock order for anything that changes a link:
//!
//! 1. the transaction-scoped link lock (`lock_links`), taken before the
//!    transaction's first write;
//! 2. menu rows, sorted by id;
//! 3. page rows, sorted by id.
//!
//! Writers that touch a single row (plain field updates, view counters, raw
//! deletes) never wait on a second row, so they cannot close a cycle with a
//! link change.

use cms_core::error::DomainError;
use sqlx::PgConnection;

use super::map_db_error;

/// Advisory lock key shared by every association change.
const LINKS_LOCK_KEY: i64 = 0x636d_735f_6c6e_6b73;

/// Serializes association changes until the transaction ends.
pub(crate) async fn lock_links(conn: &mut PgConnection) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(LINKS_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Menu", "locking links for", e))?;
    Ok(())
}

/// Locks the given menus plus every menu listing one of `page_ids`.
/// Returns the ids that were found, in lock order.
async fn lock_menus(
    conn: &mut PgConnection,
    menu_ids: &[String],
    page_ids: &[String],
) -> Result<Vec<String>, DomainError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT id FROM menus WHERE id = ANY($1) OR pages && $2 ORDER BY id FOR UPDATE",
    )
    .bind(menu_ids)
    .bind(page_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "locking", e))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Locks the pages that exist among `page_ids`, in id order.
async fn lock_pages(conn: &mut PgConnection, page_ids: &[String]) -> Result<Vec<String>, DomainError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM pages WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(page_ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_db_error("Page", "locking", e))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

fn require(found: &[String], wanted: &[String], missing: fn(String) -> DomainError) -> Result<(), DomainError> {
    match wanted.iter().find(|id| !found.contains(id)) {
        Some(id) => Err(missing(id.clone())),
        None => Ok(()),
    }
}

/// Points the page at `menu_id` and makes that menu the only list holding it.
pub(crate) async fn link_page(
    conn: &mut PgConnection,
    menu_id: &str,
    page_id: &str,
) -> Result<(), DomainError> {
    let menu_ids = vec![menu_id.to_string()];
    let page_ids = vec![page_id.to_string()];

    let menus = lock_menus(conn, &menu_ids, &page_ids).await?;
    let pages = lock_pages(conn, &page_ids).await?;
    require(&pages, &page_ids, DomainError::PageNotFound)?;
    require(&menus, &menu_ids, DomainError::MenuNotFound)?;

    sqlx::query(
        r#"
        UPDATE menus
        SET pages = array_remove(pages, $1), updated_at = NOW()
        WHERE $1 = ANY(pages) AND id <> $2
        "#,
    )
    .bind(page_id)
    .bind(menu_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "unlinking page from", e))?;

    sqlx::query(
        r#"
        UPDATE menus
        SET pages = array_append(pages, $1), updated_at = NOW()
        WHERE id = $2 AND NOT ($1 = ANY(pages))
        "#,
    )
    .bind(page_id)
    .bind(menu_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "linking page to", e))?;

    sqlx::query("UPDATE pages SET menu_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(page_id)
        .bind(menu_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "linking", e))?;

    Ok(())
}

/// Takes the page out of every menu list and clears its `menu_id`.
pub(crate) async fn unlink_page(conn: &mut PgConnection, page_id: &str) -> Result<(), DomainError> {
    let page_ids = vec![page_id.to_string()];

    lock_menus(conn, &[], &page_ids).await?;
    let pages = lock_pages(conn, &page_ids).await?;
    require(&pages, &page_ids, DomainError::PageNotFound)?;

    sqlx::query(
        r#"
        UPDATE menus
        SET pages = array_remove(pages, $1), updated_at = NOW()
        WHERE $1 = ANY(pages)
        "#,
    )
    .bind(page_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "unlinking page from", e))?;

    sqlx::query("UPDATE pages SET menu_id = NULL, updated_at = NOW() WHERE id = $1")
        .bind(page_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "unlinking", e))?;

    Ok(())
}

/// Removes `page_id` from one menu. The page row may already be gone.
pub(crate) async fn detach_page(
    conn: &mut PgConnection,
    menu_id: &str,
    page_id: &str,
) -> Result<(), DomainError> {
    let menu_ids = vec![menu_id.to_string()];

    let menus = lock_menus(conn, &menu_ids, &[]).await?;
    require(&menus, &menu_ids, DomainError::MenuNotFound)?;
    lock_pages(conn, &[page_id.to_string()]).await?;

    sqlx::query("UPDATE menus SET pages = array_remove(pages, $2), updated_at = NOW() WHERE id = $1")
        .bind(menu_id)
        .bind(page_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Menu", "unlinking page from", e))?;

    sqlx::query(
        "UPDATE pages SET menu_id = NULL, updated_at = NOW() WHERE id = $1 AND menu_id = $2",
    )
    .bind(page_id)
    .bind(menu_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Page", "unlinking", e))?;

    Ok(())
}

/// Replaces the menu's list with `page_ids` (already deduplicated) and
/// updates both sides: dropped pages lose their `menu_id`, listed pages
/// leave any other menu and point here.
pub(crate) async fn replace_menu_pages(
    conn: &mut PgConnection,
    menu_id: &str,
    page_ids: &[String],
) -> Result<(), DomainError> {
    let menu_ids = vec![menu_id.to_string()];

    let menus = lock_menus(conn, &menu_ids, page_ids).await?;
    require(&menus, &menu_ids, DomainError::MenuNotFound)?;

    // Pages currently pointing here lose their link unless they are relisted.
    let current: Vec<(String,)> = sqlx::query_as("SELECT id FROM pages WHERE menu_id = $1")
        .bind(menu_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "locking", e))?;
    let mut affected: Vec<String> = current.into_iter().map(|(id,)| id).collect();
    affected.extend(page_ids.iter().cloned());
    affected.sort();
    affected.dedup();

    let pages = lock_pages(conn, &affected).await?;
    require(&pages, page_ids, DomainError::PageNotFound)?;

    sqlx::query(
        r#"
        UPDATE pages
        SET menu_id = NULL, updated_at = NOW()
        WHERE menu_id = $1 AND NOT (id = ANY($2))
        "#,
    )
    .bind(menu_id)
    .bind(page_ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Page", "unlinking", e))?;

    sqlx::query(
        r#"
        UPDATE menus
        SET pages = ARRAY(SELECT p FROM unnest(pages) WITH ORDINALITY AS t(p, n)
                          WHERE NOT (p = ANY($2)) ORDER BY n),
            updated_at = NOW()
        WHERE id <> $1 AND pages && $2
        "#,
    )
    .bind(menu_id)
    .bind(page_ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "unlinking pages from", e))?;

    sqlx::query("UPDATE pages SET menu_id = $1, updated_at = NOW() WHERE id = ANY($2)")
        .bind(menu_id)
        .bind(page_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "linking", e))?;

    sqlx::query("UPDATE menus SET pages = $2, updated_at = NOW() WHERE id = $1")
        .bind(menu_id)
        .bind(page_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Menu", "linking pages to", e))?;

    Ok(())
}

/// Deletes the page after taking it out of every menu list.
pub(crate) async fn delete_page_detaching(conn: &mut PgConnection, page_id: &str) -> Result<bool, DomainError> {
    let page_ids = vec![page_id.to_string()];

    lock_menus(conn, &[], &page_ids).await?;
    if lock_pages(conn, &page_ids).await?.is_empty() {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE menus
        SET pages = array_remove(pages, $1), updated_at = NOW()
        WHERE $1 = ANY(pages)
        "#,
    )
    .bind(page_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error("Menu", "unlinking page from", e))?;

    let result = sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(page_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "deleting", e))?;

    Ok(result.rows_affected() > 0)
}

/// Deletes the menu after clearing `menu_id` on every page pointing at it.
pub(crate) async fn delete_menu_detaching(conn: &mut PgConnection, menu_id: &str) -> Result<bool, DomainError> {
    if lock_menus(conn, &[menu_id.to_string()], &[]).await?.is_empty() {
        return Ok(false);
    }

    let linked: Vec<(String,)> = sqlx::query_as("SELECT id FROM pages WHERE menu_id = $1")
        .bind(menu_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "locking", e))?;
    let linked: Vec<String> = linked.into_iter().map(|(id,)| id).collect();
    lock_pages(conn, &linked).await?;

    sqlx::query("UPDATE pages SET menu_id = NULL, updated_at = NOW() WHERE menu_id = $1")
        .bind(menu_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Page", "unlinking", e))?;

    let result = sqlx::query("DELETE FROM menus WHERE id = $1")
        .bind(menu_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Menu", "deleting", e))?;

    Ok(result.rows_affected() > 0)
}
