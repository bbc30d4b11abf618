use nanoid::nanoid;

/// Produces unique identifiers for new messages
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// 21 character URL-safe random ids
#[derive(Debug, Clone, Copy, Default)]
pub struct NanoIdGenerator;

impl IdGenerator for NanoIdGenerator {
    fn next_id(&self) -> String {
        nanoid!()
    }
}
