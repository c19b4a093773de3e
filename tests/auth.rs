mod common;

use bistro::{
    auth::{
        jwt::{JwtConfig, JwtService},
        user::{Backend, Credentials, Registration},
    },
    entities::sea_orm_active_enums::UserType,
    error::AppError,
};
use common::setup;

const SECRET: &str = "integration-test-secret-with-enough-bytes";

fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
    }
}

#[tokio::test]
async fn registered_member_can_log_in() {
    let db = setup().await;
    let backend = Backend::new(db);

    let user = backend
        .register(registration("ada_l", "Ada@Example.com"))
        .await
        .unwrap();
    assert_eq!(user.user_type, UserType::Member);
    assert_eq!(user.email, "ada@example.com");
    assert_ne!(user.password_hash, "correct horse battery");

    let found = backend
        .verify_credentials(&Credentials {
            username: "ada_l".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let wrong = backend
        .verify_credentials(&Credentials {
            username: "ada_l".to_string(),
            password: "incorrect horse".to_string(),
        })
        .await
        .unwrap();
    assert!(wrong.is_none());

    let nobody = backend
        .verify_credentials(&Credentials {
            username: "nobody".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap();
    assert!(nobody.is_none());
}

#[tokio::test]
async fn registration_rules_are_enforced() {
    let db = setup().await;
    let backend = Backend::new(db);
    backend
        .register(registration("ada_l", "ada@example.com"))
        .await
        .unwrap();

    let taken_name = backend
        .register(registration("ada_l", "other@example.com"))
        .await;
    assert!(matches!(taken_name, Err(AppError::Conflict(_))));

    let taken_email = backend
        .register(registration("charles", "ADA@example.com"))
        .await;
    assert!(matches!(taken_email, Err(AppError::Conflict(_))));

    let short_name = backend.register(registration("ada", "a@example.com")).await;
    assert!(matches!(short_name, Err(AppError::Validation(_))));

    let short_password = backend
        .register(Registration {
            password: "short".to_string(),
            ..registration("charles", "charles@example.com")
        })
        .await;
    assert!(matches!(short_password, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn issued_token_carries_the_role() {
    let db = setup().await;
    let backend = Backend::new(db);
    let manager = backend
        .create_with_role(registration("manager", "manager@example.com"), UserType::Manager)
        .await
        .unwrap();
    assert_eq!(manager.user_type, UserType::Manager);
    assert_eq!(backend.get_user(manager.id).await.unwrap().user_type, UserType::Manager);

    let jwt = JwtService::with_config(JwtConfig::new(SECRET));
    let token = jwt.issue_token(&manager).unwrap();
    let claims = jwt.validate_token(&token).unwrap();

    assert_eq!(claims.sub, manager.id.to_string());
    assert_eq!(claims.username, "manager");
    assert_eq!(claims.role, UserType::Manager);
    assert_eq!(claims.iss, "bistro-rs");
}

#[tokio::test]
async fn provisioned_account_is_written_once_with_its_role() {
    let db = setup().await;
    let backend = Backend::new(db);
    backend
        .register(registration("ada_l", "ada@example.com"))
        .await
        .unwrap();

    let clash = backend
        .create_with_role(registration("waiter", "ADA@example.com"), UserType::Staff)
        .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    let users = backend.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_type, UserType::Member);

    let staff = backend
        .create_with_role(registration("waiter", "waiter@example.com"), UserType::Staff)
        .await
        .unwrap();
    assert_eq!(backend.get_user(staff.id).await.unwrap().user_type, UserType::Staff);
    assert_eq!(backend.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn managers_change_roles_of_other_accounts() {
    let db = setup().await;
    let backend = Backend::new(db);
    let manager = backend
        .create_with_role(registration("manager", "manager@example.com"), UserType::Manager)
        .await
        .unwrap();
    let member = backend
        .register(registration("ada_l", "ada@example.com"))
        .await
        .unwrap();

    let promoted = backend
        .set_role(manager.id, member.id, UserType::Staff)
        .await
        .unwrap();
    assert_eq!(promoted.user_type, UserType::Staff);
    assert_eq!(backend.get_user(member.id).await.unwrap().user_type, UserType::Staff);

    let own = backend
        .set_role(manager.id, manager.id, UserType::Member)
        .await;
    assert!(matches!(own, Err(AppError::Validation(_))));

    let missing = backend.set_role(manager.id, 9999, UserType::Staff).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
