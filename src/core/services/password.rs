use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::models::AuthIdentity;
use crate::core::services::LoopMeetService;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::identity::{IdentityError, IdentityProvider};
use crate::infrastructure::storage::Storage;

#[derive(Deserialize, Debug, ToSchema, Clone, Default)]
pub struct PasswordChangeRequest {
    pub email: Option<String>,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordChangeFailureReason {
    MissingFields,
    PasswordMismatch,
    PasswordPolicyFailed,
    MissingEmail,
    IdentityLookupFailed,
    CurrentPasswordInvalid,
    SupabaseUpdateFailed,
    SupabaseUnexpectedError,
    ServiceNotConfigured,
}

/// Which of the candidate sources produced the effective email.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmailSource {
    Request,
    Profile,
    Claim,
    IdentityProvider,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEmail {
    pub email: String,
    pub source: EmailSource,
}

/// Diagnostic metadata carried on every failure path: which sources had an
/// email, and whether the account already holds an email identity. Logged
/// for telemetry; never behavior-affecting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmailDiagnostics {
    pub has_email_from_request: bool,
    pub has_email_from_profile: bool,
    pub has_email_from_claim: bool,
    pub has_email_from_auth_user: bool,
    pub has_email_identity: bool,
}

#[derive(Clone, Debug)]
pub struct PasswordChangeFailure {
    pub reason: PasswordChangeFailureReason,
    pub message: String,
    pub diagnostics: EmailDiagnostics,
}

impl PasswordChangeFailure {
    fn new(reason: PasswordChangeFailureReason, message: impl Into<String>, diagnostics: EmailDiagnostics) -> Self {
        PasswordChangeFailure {
            reason,
            message: message.into(),
            diagnostics,
        }
    }
}

/// First non-blank email wins: request, then stored profile, then token
/// claim, then whatever the identity provider reports.
pub fn resolve_email(
    requested: Option<&str>,
    profile: Option<&str>,
    claim: Option<&str>,
    auth_user: Option<&str>,
) -> (Option<ResolvedEmail>, EmailDiagnostics) {
    let diagnostics = EmailDiagnostics {
        has_email_from_request: !is_blank(requested),
        has_email_from_profile: !is_blank(profile),
        has_email_from_claim: !is_blank(claim),
        has_email_from_auth_user: !is_blank(auth_user),
        has_email_identity: false,
    };

    let resolved = [
        (requested, EmailSource::Request),
        (profile, EmailSource::Profile),
        (claim, EmailSource::Claim),
        (auth_user, EmailSource::IdentityProvider),
    ]
    .into_iter()
    .find_map(|(candidate, source)| {
        candidate
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| ResolvedEmail {
                email: email.to_string(),
                source,
            })
    });

    (resolved, diagnostics)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl<S: Storage, C: Cache, I: IdentityProvider> LoopMeetService<S, C, I> {
    /// Reconciles a password change against the identity provider. Local
    /// validation runs before any network call; every failure keeps the
    /// email-source diagnostics attached.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        profile_email: Option<&str>,
        claim_email: Option<&str>,
        access_token: Option<&str>,
        request: &PasswordChangeRequest,
    ) -> Result<(), PasswordChangeFailure> {
        let mut diagnostics = EmailDiagnostics {
            has_email_from_request: !is_blank(request.email.as_deref()),
            has_email_from_profile: !is_blank(profile_email),
            has_email_from_claim: !is_blank(claim_email),
            ..EmailDiagnostics::default()
        };

        if request.new_password.trim().is_empty() || request.confirm_password.trim().is_empty() {
            return Err(PasswordChangeFailure::new(
                PasswordChangeFailureReason::MissingFields,
                "New password and confirmation are required.",
                diagnostics,
            ));
        }
        if request.new_password != request.confirm_password {
            return Err(PasswordChangeFailure::new(
                PasswordChangeFailureReason::PasswordMismatch,
                "Passwords do not match.",
                diagnostics,
            ));
        }
        if let Err(message) = self.password_policy.validate(&request.new_password) {
            return Err(PasswordChangeFailure::new(
                PasswordChangeFailureReason::PasswordPolicyFailed,
                message,
                diagnostics,
            ));
        }

        let access_token = access_token.map(str::trim).filter(|token| !token.is_empty());
        let (Some(access_token), true) = (access_token, self.identity.is_configured()) else {
            error!("Identity provider configuration missing required values for password change");
            return Err(PasswordChangeFailure::new(
                PasswordChangeFailureReason::ServiceNotConfigured,
                "Password service is not configured.",
                diagnostics,
            ));
        };

        let auth_user = match self.identity.get_auth_user(access_token).await {
            Ok(auth_user) => auth_user,
            Err(e) => {
                warn!("Password change failed identity lookup for {}: {}", user_id, e);
                return Err(PasswordChangeFailure::new(
                    PasswordChangeFailureReason::IdentityLookupFailed,
                    "Unable to verify account identity providers.",
                    diagnostics,
                ));
            }
        };

        let (resolved, resolution_diagnostics) = resolve_email(
            request.email.as_deref(),
            profile_email,
            claim_email,
            auth_user.email.as_deref(),
        );
        diagnostics = EmailDiagnostics {
            has_email_identity: auth_user.has_email_identity,
            ..resolution_diagnostics
        };

        let Some(resolved) = resolved else {
            let message = if auth_user.has_email_identity {
                "Enter your account email to verify your current password."
            } else {
                "Enter your account email to set your password."
            };
            warn!(
                "Password change failed for {}: no email resolved (has_email_identity={})",
                user_id, diagnostics.has_email_identity
            );
            return Err(PasswordChangeFailure::new(
                PasswordChangeFailureReason::MissingEmail,
                message,
                diagnostics,
            ));
        };

        if auth_user.has_email_identity {
            if request.current_password.trim().is_empty() {
                return Err(PasswordChangeFailure::new(
                    PasswordChangeFailureReason::MissingFields,
                    "Current password is required.",
                    diagnostics,
                ));
            }

            match self.identity.verify_password(&resolved.email, &request.current_password).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Password change rejected for {}: current password invalid", user_id);
                    return Err(PasswordChangeFailure::new(
                        PasswordChangeFailureReason::CurrentPasswordInvalid,
                        "Current password is incorrect.",
                        diagnostics,
                    ));
                }
                Err(e) => {
                    warn!("Unexpected response verifying current password for {}: {}", user_id, e);
                    return Err(PasswordChangeFailure::new(
                        PasswordChangeFailureReason::SupabaseUnexpectedError,
                        "Unable to verify current password.",
                        diagnostics,
                    ));
                }
            }
        }

        // Accounts without an email identity also get the resolved email set,
        // unless the provider already has it on record.
        let set_email = !auth_user.has_email_identity
            && auth_user
                .email
                .as_deref()
                .is_none_or(|current| !current.eq_ignore_ascii_case(&resolved.email));
        let new_email = set_email.then_some(resolved.email.as_str());

        if let Err(e) = self.identity.update_credentials(access_token, &request.new_password, new_email).await {
            error!("Identity provider password update failed for {}: {}", user_id, e);
            let reason = match e {
                IdentityError::UpdateRejected(_) => PasswordChangeFailureReason::SupabaseUpdateFailed,
                _ => PasswordChangeFailureReason::SupabaseUnexpectedError,
            };
            return Err(PasswordChangeFailure::new(reason, "Unable to update password.", diagnostics));
        }

        if !auth_user.has_email_identity {
            // The account just gained a password-capable identity.
            let identity = AuthIdentity {
                id: Uuid::new_v4(),
                user_id,
                provider: "email".to_string(),
                provider_subject: user_id.to_string(),
                created_at: Utc::now(),
            };
            if let Err(e) = self.storage.add_auth_identity(identity).await {
                warn!("Failed to record email identity for {}: {}", user_id, e);
            }
        }

        info!("Password changed for {} (email source: {:?})", user_id, resolved.source);
        Ok(())
    }
}
