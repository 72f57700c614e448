mod attribute;
mod model;
mod registry;
mod types;

pub use attribute::{find_attr, AttrDef};
pub use model::{MemberDef, MemberKind, ParamDef, TypeDef, TypeKind};
pub use registry::{TypeRegistry, TypeSource};
pub use types::TypeRef;
