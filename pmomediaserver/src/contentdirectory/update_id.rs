//! Compteur SystemUpdateID

use std::sync::atomic::{AtomicU32, Ordering};

/// SystemUpdateID du ContentDirectory
///
/// Démarre à 1, n'est jamais remis à zéro et ne décroît jamais (il sature à
/// `u32::MAX`). Partagé entre toutes les requêtes via un `Arc`.
#[derive(Debug)]
pub struct UpdateCounter {
    value: AtomicU32,
}

impl UpdateCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU32::new(1),
        }
    }

    pub fn current(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    /// Incrémente et renvoie la nouvelle valeur
    pub fn bump(&self) -> u32 {
        let previous = self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some(v.saturating_add(1)))
            .unwrap_or_else(|v| v);
        let new_id = previous.saturating_add(1);
        tracing::info!("ContentDirectory: SystemUpdateID -> {}", new_id);
        new_id
    }
}

impl Default for UpdateCounter {
    fn default() -> Self {
        Self::new()
    }
}
