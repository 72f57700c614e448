use typesync_core::{Result, TypeDef, TypeRef};

use super::{quote, EmitContext, Library};
use crate::writer::CodeWriter;

const MVC: &str = "Microsoft.AspNetCore.Mvc";
const ROUTE: &str = "RouteAttribute";
const NON_ACTION: &str = "NonActionAttribute";
const ACTION_RESULT: &str = "Microsoft.AspNetCore.Mvc.ActionResult";

/// Emit an endpoint namespace: base URL, one declared function per action,
/// the method URL map and the runtime binding.
pub fn emit(
    ty: &TypeDef,
    identifier: &str,
    ctx: &mut EmitContext<'_>,
    w: &mut CodeWriter,
) -> Result<()> {
    let base_url = base_url(ty, ctx)?;
    let actions: Vec<_> = ty
        .methods()
        .filter(|m| m.attr(MVC, NON_ACTION).is_none())
        .collect();

    let mut signatures = Vec::with_capacity(actions.len());
    for action in &actions {
        let request = match action.params.first() {
            Some(param) => ctx.type_name(&param.type_ref),
            None => ctx.lib(Library::Core, "ServiceRequest"),
        };
        let options = ctx.lib(Library::Core, "ServiceOptions");
        let response = ctx.type_name(unwrap_action_result(&action.type_ref));
        signatures.push(format!(
            "export declare function {}(request: {}, onSuccess?: (response: {}) => void, opt?: {}<any>): PromiseLike<{}>;",
            action.name, request, response, options, response
        ));
    }
    let service_request = if actions.is_empty() {
        String::new()
    } else {
        ctx.lib(Library::Core, "serviceRequest")
    };

    w.in_brace(&format!("export namespace {}", identifier), |w| {
        w.line(format!("export const baseUrl = {};", quote(&base_url)));

        for signature in &signatures {
            w.blank();
            w.line(signature);
        }

        w.blank();
        w.in_block("export const Methods = {", "} as const;", |w| {
            w.comma_lines(
                actions
                    .iter()
                    .map(|a| format!("{}: {}", a.name, quote(&format!("{}/{}", base_url, a.name)))),
            );
            Ok(())
        })?;

        if !actions.is_empty() {
            w.blank();
            w.in_block("[", "].forEach(x => {", |w| {
                w.comma_lines(actions.iter().map(|a| quote(&a.name)));
                Ok(())
            })?;
            w.in_block(
                &format!("    (<any>{})[x] = function (r, s, o) {{", identifier),
                "    };",
                |w| {
                    w.line(format!(
                        "    return {}(baseUrl + '/' + x, r, s, o);",
                        service_request
                    ));
                    Ok(())
                },
            )?;
            w.line("});");
        }
        Ok(())
    })
}

/// Route template with the `Services/` prefix and action placeholder removed,
/// or `<namespace path>/<controller stem>` when no route is declared.
fn base_url(ty: &TypeDef, ctx: &EmitContext<'_>) -> Result<String> {
    if let Some(route) = ty.attr(MVC, ROUTE) {
        if let Some(template) = route.string_arg(&["0", "template"])? {
            let template = template.trim_matches('/');
            let template = template.strip_prefix("Services/").unwrap_or(template);
            let template = template.strip_suffix("/[action]").unwrap_or(template);
            return Ok(template.to_string());
        }
    }

    let stem = ty.name.strip_suffix("Controller").unwrap_or(&ty.name);
    let relative = ctx.relative_namespace();
    if relative.is_empty() {
        Ok(stem.to_string())
    } else {
        Ok(format!("{}/{}", relative.replace('.', "/"), stem))
    }
}

fn unwrap_action_result(type_ref: &TypeRef) -> &TypeRef {
    match type_ref {
        TypeRef::Named { name, args } if name == ACTION_RESULT && args.len() == 1 => &args[0],
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use typesync_core::{AttrDef, MemberDef, TypeDef, TypeRef};

    use crate::emit::test_support::render;
    use crate::output::OutputMode;

    fn controller() -> TypeDef {
        let mut def = TypeDef::new("Acme.Northwind", "CustomerController");
        def.base = Some(TypeRef::named("Microsoft.AspNetCore.Mvc.ControllerBase"));
        def.members.push(MemberDef::method(
            "Create",
            TypeRef::from_type_string("Serenity.Services.SaveRequest<Acme.Northwind.CustomerRow>"),
            TypeRef::named("Serenity.Services.SaveResponse"),
        ));
        def.members.push(MemberDef::method(
            "List",
            TypeRef::named("Serenity.Services.ListRequest"),
            TypeRef::from_type_string(
                "Microsoft.AspNetCore.Mvc.ActionResult<Serenity.Services.ListResponse<Acme.Northwind.CustomerRow>>",
            ),
        ));
        def.members.push(
            MemberDef::method("Helper", TypeRef::String, TypeRef::String)
                .with_attr(AttrDef::new("Microsoft.AspNetCore.Mvc", "NonActionAttribute")),
        );
        def
    }

    fn row() -> TypeDef {
        TypeDef::new("Acme.Northwind", "CustomerRow")
    }

    #[test]
    fn test_service_namespace_mode() {
        let (body, _) = render(
            vec![controller(), row()],
            "Acme.Northwind.CustomerController",
            OutputMode::Namespace,
        );

        assert!(body.starts_with("export namespace CustomerService {\n"));
        assert!(body.contains("export const baseUrl = 'Northwind/Customer';"));
        assert!(body.contains(
            "export declare function Create(request: Serenity.SaveRequest<CustomerRow>, onSuccess?: (response: Serenity.SaveResponse) => void, opt?: Serenity.ServiceOptions<any>): PromiseLike<Serenity.SaveResponse>;"
        ));
        assert!(body.contains("(response: Serenity.ListResponse<CustomerRow>) => void"));
        assert!(body.contains("Create: 'Northwind/Customer/Create',"));
        assert!(body.contains("List: 'Northwind/Customer/List'\n"));
        assert!(!body.contains("Helper"));
        assert!(body.contains("return Serenity.serviceRequest(baseUrl + '/' + x, r, s, o);"));
    }

    #[test]
    fn test_service_route_attribute() {
        let mut def = controller();
        def.attributes.push(
            AttrDef::new("Microsoft.AspNetCore.Mvc", "RouteAttribute")
                .with_arg("0", "Services/Sales/Customer/[action]"),
        );

        let (body, imports) = render(
            vec![def, row()],
            "Acme.Northwind.CustomerController",
            OutputMode::Module,
        );
        assert!(body.contains("export const baseUrl = 'Sales/Customer';"));
        assert!(imports.contains("./CustomerRow"));
        assert!(imports.contains("serviceRequest"));
    }
}
