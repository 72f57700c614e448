pub mod config;
pub mod error;
pub mod schema;

pub use config::{GeneratorConfig, InputConfig, OutputConfig, TypesyncConfig};
pub use error::{Result, TypesyncError};
pub use schema::{
    AttrDef, MemberDef, MemberKind, ParamDef, TypeDef, TypeKind, TypeRef, TypeRegistry, TypeSource,
};
