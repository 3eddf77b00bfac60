//! OpenAPI document for the user routes, served at `/api-docs/openapi.json`.

use crate::error::ErrorBody;
use crate::models::{NewUser, User, UserChanges};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User service API",
        description = "Create, read, update and delete users stored in PostgreSQL."
    ),
    paths(
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
    ),
    components(schemas(User, NewUser, UserChanges, ErrorBody)),
    tags((name = "users", description = "User resource"))
)]
pub struct ApiDoc;
