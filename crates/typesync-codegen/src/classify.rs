//! Strategy selection for type definitions.
//!
//! The classifier evaluates every predicate, collects the matching tags and
//! picks the highest-priority one. `Basic` always matches, so classification
//! is total. Request-shaped form types fan out to `Form` and `Basic`.

use std::collections::BTreeSet;
use std::fmt;

use typesync_core::{Result, TypeDef, TypeSource, TypesyncError};

pub const COMPONENT_MODEL: &str = "Serenity.ComponentModel";
pub const EXTENSIBILITY: &str = "Serenity.Extensibility";
pub const FORM_SCRIPT: &str = "FormScriptAttribute";
pub const COLUMNS_SCRIPT: &str = "ColumnsScriptAttribute";
pub const NESTED_PERMISSION_KEYS: &str = "NestedPermissionKeysAttribute";

pub const SERVICE_REQUEST: &str = "Serenity.Services.ServiceRequest";
pub const ROW_BASE: &str = "Serenity.Data.Row";

/// Controller bases recognized as service endpoints.
pub const SERVICE_BASES: [&str; 2] = [
    "Microsoft.AspNetCore.Mvc.ControllerBase",
    "System.Web.Mvc.Controller",
];

const CONTROLLER_SUFFIX: &str = "Controller";

/// Generation strategy, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    Enum,
    Service,
    Form,
    Columns,
    PermissionKeys,
    Row,
    Basic,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Enum => "enum",
            Strategy::Service => "service",
            Strategy::Form => "form",
            Strategy::Columns => "columns",
            Strategy::PermissionKeys => "permission-keys",
            Strategy::Row => "row",
            Strategy::Basic => "basic",
        }
    }

    /// Whether emission of this strategy pulls member types into the worklist.
    pub fn enqueues_members(&self) -> bool {
        matches!(self, Strategy::Form | Strategy::Columns)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One selected strategy with its output identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub strategy: Strategy,
    pub identifier: String,
}

/// Result of classifying one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Winning strategy first; a second entry only for dual emission.
    pub selections: Vec<Selection>,
    /// Every tag whose predicate matched.
    pub matched: BTreeSet<Strategy>,
}

impl Classification {
    pub fn primary(&self) -> &Selection {
        &self.selections[0]
    }
}

/// Priority-ordered classifier over a type source.
pub struct Classifier<'a> {
    source: &'a dyn TypeSource,
    request_suffix: &'a str,
}

impl<'a> Classifier<'a> {
    pub fn new(source: &'a dyn TypeSource, request_suffix: &'a str) -> Self {
        Self {
            source,
            request_suffix,
        }
    }

    /// Every strategy whose predicate holds for `ty`.
    pub fn matching(&self, ty: &TypeDef) -> Result<BTreeSet<Strategy>> {
        let mut tags = BTreeSet::new();

        if ty.is_enum() {
            tags.insert(Strategy::Enum);
        }
        if self.is_controller(ty)? {
            tags.insert(Strategy::Service);
        }
        if ty.attr(COMPONENT_MODEL, FORM_SCRIPT).is_some() {
            tags.insert(Strategy::Form);
        }
        if ty.attr(COMPONENT_MODEL, COLUMNS_SCRIPT).is_some() {
            tags.insert(Strategy::Columns);
        }
        if ty.attr(EXTENSIBILITY, NESTED_PERMISSION_KEYS).is_some()
            || ty.attr(COMPONENT_MODEL, NESTED_PERMISSION_KEYS).is_some()
        {
            tags.insert(Strategy::PermissionKeys);
        }
        if self.source.is_subclass_of(ty, ROW_BASE, 0)?
            || self.source.is_subclass_of(ty, ROW_BASE, 1)?
        {
            tags.insert(Strategy::Row);
        }
        tags.insert(Strategy::Basic);

        Ok(tags)
    }

    /// Select the strategy (or strategies, for dual emission) for `ty`.
    pub fn classify(&self, ty: &TypeDef) -> Result<Classification> {
        let matched = self.matching(ty)?;
        let Some(&winner) = matched.iter().next() else {
            return Err(TypesyncError::ClassificationGap(ty.full_name()));
        };

        let selections = match winner {
            Strategy::Service => vec![Selection {
                strategy: winner,
                identifier: controller_identifier(&ty.name),
            }],
            Strategy::Form => {
                let request_shaped = self.is_service_request(ty)?;
                let mut selections = vec![Selection {
                    strategy: winner,
                    identifier: form_identifier(&ty.name, self.request_suffix, request_shaped),
                }];
                if request_shaped {
                    selections.push(Selection {
                        strategy: Strategy::Basic,
                        identifier: ty.name.clone(),
                    });
                }
                selections
            }
            _ => vec![Selection {
                strategy: winner,
                identifier: ty.name.clone(),
            }],
        };

        Ok(Classification {
            selections,
            matched,
        })
    }

    fn is_controller(&self, ty: &TypeDef) -> Result<bool> {
        for base in SERVICE_BASES {
            if self.source.is_subclass_of(ty, base, 0)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_service_request(&self, ty: &TypeDef) -> Result<bool> {
        self.source.is_subclass_of(ty, SERVICE_REQUEST, 0)
    }
}

/// `CustomerRequest` becomes `CustomerForm` when the type is request-shaped.
pub fn form_identifier(name: &str, request_suffix: &str, request_shaped: bool) -> String {
    match name.strip_suffix(request_suffix) {
        Some(stem) if request_shaped && !request_suffix.is_empty() => format!("{}Form", stem),
        _ => name.to_string(),
    }
}

/// `CustomerController` becomes `CustomerService`.
pub fn controller_identifier(name: &str) -> String {
    let stem = name.strip_suffix(CONTROLLER_SUFFIX).unwrap_or(name);
    format!("{}Service", stem)
}
