// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// collection constants
pub const DEFAULT_COLLECTION: &str = "default";

// index kind tags, as they appear in an index-creation request
pub const HASH_INDEX: &str = "hashed";
// reserved for the ordered index extension point
pub const ORDERED_INDEX: &str = "ordered";

// logical query keywords
pub const AND_KEY: &str = "$and";
pub const OR_KEY: &str = "$or";
pub const NOR_KEY: &str = "$nor";
pub const NOT_KEY: &str = "$not";
