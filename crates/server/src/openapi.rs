use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct CreateUserRequestDoc { pub username: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginUserRequestDoc { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct UserResponseDoc { pub id: Uuid, pub username: String, pub email: String, pub token: String }

#[derive(ToSchema)]
pub struct ErrorResponseDoc { pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::signup,
        crate::routes::users::login,
    ),
    components(
        schemas(
            CreateUserRequestDoc,
            LoginUserRequestDoc,
            UserResponseDoc,
            ErrorResponseDoc,
        )
    ),
    tags(
        (name = "users")
    )
)]
pub struct ApiDoc;
