//! The account service: one resource, four endpoints.
//!
//! ```text
//! designgen generate demos/account -g server,openapi -o <crate>/src/api
//! ```

use designgen_design::{Context, FieldType, HttpMethod};

pub fn design(ctx: &mut Context) {
    ctx.api("account", |api| {
        api.title("Account API")
            .description("Manage customer accounts.")
            .version("1.0");

        api.user_type("Account", |t| {
            t.description("A customer account.");
            t.required("id", FieldType::Integer);
            t.required("name", FieldType::String);
            t.field("ownerEmail", FieldType::String);
            t.field("tags", FieldType::list(FieldType::String));
        });
        api.user_type("CreateAccount", |t| {
            t.required("name", FieldType::String);
            t.field("ownerEmail", FieldType::String);
        });
        api.user_type("AccountId", |t| {
            t.required("id", FieldType::Integer);
        });

        api.service("account", |svc| {
            svc.description("Account management.");
            svc.endpoint("create", HttpMethod::Post, "/accounts", |e| {
                e.description("Open an account.")
                    .payload("CreateAccount")
                    .result(FieldType::reference("Account"));
            });
            svc.endpoint("list", HttpMethod::Get, "/accounts", |e| {
                e.result(FieldType::list(FieldType::reference("Account")));
            });
            svc.endpoint("show", HttpMethod::Get, "/accounts/{id}", |e| {
                e.payload("AccountId").result(FieldType::reference("Account"));
            });
            svc.endpoint("delete", HttpMethod::Delete, "/accounts/{id}", |e| {
                e.description("Close an account.").payload("AccountId");
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_evaluates() {
        let mut ctx = Context::new();
        design(&mut ctx);
        ctx.evaluate().unwrap();
        assert_eq!(ctx.roots().unwrap().len(), 1);
    }
}
