//! Registry of pipelines keyed by session.
//!
//! The wider application keeps one refinement run per user session; here
//! that ambient store is explicit local state threaded through calls
//! instead of a shared global.

use std::collections::HashMap;

use ideaforge_ids::SessionId;

use crate::config::PipelineConfig;
use crate::pipeline::IdeaPipeline;

/// Owns every live pipeline. New sessions inherit the registry's config.
#[derive(Debug)]
pub struct SessionRegistry {
    config: PipelineConfig,
    sessions: HashMap<SessionId, IdeaPipeline>,
}

impl SessionRegistry {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Start a fresh pipeline and return its session id.
    pub fn create(&mut self) -> SessionId {
        let id = SessionId::new();
        self.sessions
            .insert(id, IdeaPipeline::new(self.config.clone()));
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&IdeaPipeline> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut IdeaPipeline> {
        self.sessions.get_mut(&id)
    }

    /// Drop a session. Returns false if it was never here.
    pub fn remove(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_get_remove() {
        let mut registry = SessionRegistry::new(PipelineConfig::default());
        let id = registry.create();
        assert_eq!(registry.len(), 1);

        registry
            .get_mut(id)
            .unwrap()
            .seed_mut()
            .unwrap()
            .title = "Session seed".to_string();
        assert_eq!(registry.get(id).unwrap().seed().title, "Session seed");

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn sessions_are_independent() {
        let mut registry = SessionRegistry::new(PipelineConfig::default());
        let a = registry.create();
        let b = registry.create();

        registry.get_mut(a).unwrap().seed_mut().unwrap().title = "A".to_string();
        assert!(registry.get(b).unwrap().seed().title.is_empty());
        assert_eq!(registry.ids().len(), 2);
    }
}
