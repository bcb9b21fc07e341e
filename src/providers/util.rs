use anyhow::{Result, anyhow};

/// Replaces the record whose id matches `id`.
pub fn replace_by_id<T>(
    items: &mut [T],
    id: &str,
    item: T,
    kind: &str,
    id_of: impl Fn(&T) -> String,
) -> Result<()> {
    let slot = items
        .iter_mut()
        .find(|existing| id_of(&**existing) == id)
        .ok_or_else(|| anyhow!("{kind} not found: {id}"))?;
    *slot = item;
    Ok(())
}

/// Removes the first record whose id matches `id`.
pub fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &str,
    id_of: impl Fn(&T) -> String,
) -> Result<()> {
    let index = items
        .iter()
        .position(|existing| id_of(existing) == id)
        .ok_or_else(|| anyhow!("{kind} not found: {id}"))?;
    items.remove(index);
    Ok(())
}
