use redeemx_portal::models::{
    ChangePasswordForm, ChangePasswordRequest, Credentials, LoginForm, meets_password_policy,
};
use serde_json::json;

fn form(new_password: &str, confirm: &str) -> ChangePasswordForm {
    ChangePasswordForm {
        old_password: "Old@1234".to_string(),
        new_password: new_password.to_string(),
        confirm_new_password: confirm.to_string(),
    }
}

#[test]
fn test_password_policy_requires_every_character_class() {
    assert!(meets_password_policy("Abcdef1!"));
    assert!(!meets_password_policy("Abcde1!"), "too short");
    assert!(!meets_password_policy("abcdef1!"), "no uppercase");
    assert!(!meets_password_policy("ABCDEF1!"), "no lowercase");
    assert!(!meets_password_policy("Abcdefg!"), "no digit");
    assert!(!meets_password_policy("Abcdefg1"), "no special");
    assert!(!meets_password_policy("Abcdef1#"), "special outside the allowed set");
}

#[test]
fn test_change_password_form_messages() {
    assert_eq!(form("New@12345", "New@12345").validate(), Ok(()));
    assert_eq!(
        form("weak", "weak").validate(),
        Err("New password does not meet all the conditions.")
    );
    assert_eq!(
        form("New@12345", "New@12346").validate(),
        Err("New Password and Confirm New Password do not match.")
    );
}

#[test]
fn test_change_password_request_drops_confirmation() {
    let request = ChangePasswordRequest::from(form("New@12345", "New@12345"));
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"old_password": "Old@1234", "new_password": "New@12345"})
    );
}

#[test]
fn test_credentials_serialize_only_the_used_identifier() {
    let by_email = Credentials::from(LoginForm {
        identifier: "  jane@corp.test ".to_string(),
        password: "pw".to_string(),
    });
    assert_eq!(
        serde_json::to_value(&by_email).unwrap(),
        json!({"email": "jane@corp.test", "password": "pw"})
    );

    let by_emp_id = Credentials::from_identifier("EMP007", "pw");
    assert_eq!(
        serde_json::to_value(&by_emp_id).unwrap(),
        json!({"emp_id": "EMP007", "password": "pw"})
    );
    assert_eq!(by_emp_id.identifier(), "EMP007");
}
