use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

use crate::dto::auth_dto::{LoginForm, RegisterCustomerForm, RegisterProfessionalForm};
use crate::error::{Error, Result};
use crate::middleware::session::{end_session, start_session, MaybeUser};
use crate::utils::flash::{redirect_with_flash, set_flash, FlashLevel};
use crate::utils::validation::validate;
use crate::AppState;

/// `/` and `/login`: the login form, or the dashboard for a signed-in user.
pub async fn login_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(user) = user {
        return Ok(Redirect::to(user.role().home()).into_response());
    }
    state.templates.page(jar, "login.html", None, context! {})
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    // failures come back as Unauthorized, which renders as a flash on /login
    let user = state
        .user_service
        .authenticate(&form.email, &form.password)
        .await?;
    let jar = start_session(jar, &state.session, &user)?;
    Ok((jar, Redirect::to(user.role().home())).into_response())
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = set_flash(end_session(jar), FlashLevel::Info, "You have been logged out.");
    (jar, Redirect::to("/login")).into_response()
}

pub async fn register_customer_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(user) = user {
        return Ok(Redirect::to(user.role().home()).into_response());
    }
    state
        .templates
        .page(jar, "register_customer.html", None, context! {})
}

pub async fn register_customer(
    State(state): State<AppState>,
    Form(form): Form<RegisterCustomerForm>,
) -> Result<Response> {
    let outcome = match validate(&form) {
        Ok(()) => state.user_service.register_customer(&form).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(_) => Ok(redirect_with_flash(
            "/login",
            FlashLevel::Success,
            "Registration successful! Please log in.",
        )),
        Err(e) => e.flash_or_fail("/register/customer"),
    }
}

pub async fn register_professional_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(user) = user {
        return Ok(Redirect::to(user.role().home()).into_response());
    }
    let categories = state.catalog_service.list_categories().await?;
    state.templates.page(
        jar,
        "register_professional.html",
        None,
        context! { categories },
    )
}

pub async fn register_professional(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    match save_professional(&state, multipart).await {
        Ok(()) => Ok(redirect_with_flash(
            "/login",
            FlashLevel::Success,
            "Registration successful! Your account is waiting for admin approval.",
        )),
        Err(e) => e.flash_or_fail("/register/professional"),
    }
}

async fn save_professional(state: &AppState, mut multipart: Multipart) -> Result<()> {
    let mut form = RegisterProfessionalForm::default();
    let mut document: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "email" => form.email = field.text().await?,
            "password" => form.password = field.text().await?,
            "fullname" => form.fullname = field.text().await?,
            "address" => form.address = field.text().await?,
            "pin_code" => form.pin_code = field.text().await?,
            "service_category" => {
                form.service_category = parse_number(&field.text().await?, "service category")?
            }
            "experience" => {
                form.experience = parse_number(&field.text().await?, "number of years of experience")?
            }
            "document" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                document = Some((file_name, field.bytes().await?));
            }
            _ => {}
        }
    }

    validate(&form)?;
    let (file_name, data) = document
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| Error::Validation("Please attach your verification document.".into()))?;

    let stored = state.document_service.save(&file_name, &data).await?;
    match state
        .user_service
        .register_professional(&form, Some(stored.clone()))
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => {
            state.document_service.discard(&stored).await;
            Err(e)
        }
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("Please enter a valid {}.", what)))
}
