/// Tag subsystem - bracket-tag grammar, caret-aware mutation and catalogs
///
/// Tags are flat `[seg0|name:value|...]` annotations inside plain text. Every
/// operation here takes the text and caret by value and hands back new ones;
/// nothing in this module holds on to the document.

pub mod catalog;
pub mod format;
pub mod mutator;
pub mod parser;

// Re-export public interface
pub use catalog::{
    CatalogSource, CharacterRoster, LanguageCatalog, LanguageSet, ParameterKind, ParameterSpec,
    normalize_value, parameter_spec,
};
pub use format::format_tags;
pub use mutator::{Edit, Selection, TagEditor, TagMutator};
pub use parser::{Tag, TagSyntaxError, parse_tags, tag_at, validate_tag_syntax};
