//! User aggregate loading.
//!
//! Loads a user, then its identity (and that identity's verification) and
//! its country concurrently, composing the pieces with promises.

use promise_core::Error;
use promise_runtime::{then, Context, Promise};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::info;

/// A fully loaded user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// User id
    pub id: u32,
    /// Display name
    pub name: String,
    /// Id of the user's identity document
    pub identity_id: String,
    /// ISO code of the user's country
    pub country_id: String,
    /// Loaded identity, if any
    pub identity: Option<Identity>,
    /// Loaded country, if any
    pub country: Option<Country>,
}

/// A country record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    /// ISO code
    pub iso: String,
}

/// An identity document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    /// Identity id
    pub id: String,
    /// Card number on the document
    pub card_number: String,
    /// Verification result, once loaded
    pub verification: Option<IdentityVerification>,
}

/// The result of verifying an identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityVerification {
    /// Identity the verification belongs to
    pub identity_id: String,
    /// Whether the identity passed verification
    pub verified: bool,
}

/// Loads users and their related records with a simulated latency.
#[derive(Debug, Clone)]
pub struct UserAggregate {
    ctx: Context,
    latency: Duration,
}

impl UserAggregate {
    /// Creates an aggregate whose loads each take `latency`.
    pub fn new(ctx: &Context, latency: Duration) -> Self {
        Self {
            ctx: ctx.clone(),
            latency,
        }
    }

    fn load<T, F>(&self, what: &'static str, key: String, build: F) -> Promise<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&str) -> T + Send + 'static,
    {
        let latency = self.latency;
        Promise::new(&self.ctx, move |_| {
            info!(record = what, key = %key, "loading");
            thread::sleep(latency);
            Ok::<_, Error>(build(&key))
        })
    }

    /// Loads the bare user record.
    pub fn load_user(&self, user_id: u32) -> Promise<User> {
        self.load("user", user_id.to_string(), move |_| User {
            id: user_id,
            name: format!("name-{user_id}"),
            identity_id: format!("identity-{user_id}"),
            country_id: format!("country-{user_id}"),
            identity: None,
            country: None,
        })
    }

    /// Loads an identity without its verification.
    pub fn load_identity(&self, identity_id: &str) -> Promise<Identity> {
        self.load("identity", identity_id.to_string(), |id| Identity {
            id: id.to_string(),
            card_number: format!("card-number-{id}"),
            verification: None,
        })
    }

    /// Loads a country.
    pub fn load_country(&self, country_id: &str) -> Promise<Country> {
        self.load("country", country_id.to_string(), |iso| Country {
            iso: iso.to_string(),
        })
    }

    /// Loads the verification of an identity.
    pub fn load_identity_verification(&self, identity_id: &str) -> Promise<IdentityVerification> {
        self.load("identity verification", identity_id.to_string(), |id| {
            IdentityVerification {
                identity_id: id.to_string(),
                // Deterministic stand-in for an external check.
                verified: id.bytes().map(u32::from).sum::<u32>() % 2 == 0,
            }
        })
    }

    /// Loads a user with identity, verification and country.
    ///
    /// The identity chain and the country load run concurrently once the
    /// user record is known. Any failed load rejects the whole user.
    pub fn load_all(&self, user_id: u32) -> Promise<User> {
        let this = self.clone();
        then(&self.load_user(user_id), move |user| {
            let verifier = this.clone();
            let identity = then(&this.load_identity(&user.identity_id), move |identity| {
                let identity_id = identity.id.clone();
                then(
                    &verifier.load_identity_verification(&identity_id),
                    move |verification| {
                        Promise::resolve(Identity {
                            verification: Some(verification),
                            ..identity
                        })
                    },
                )
            });
            let country = this.load_country(&user.country_id);

            Promise::new(&this.ctx, move |_| {
                let identity = identity.await_value()?;
                let country = country.await_value()?;
                Ok::<_, Error>(User {
                    identity: Some(identity),
                    country: Some(country),
                    ..user
                })
            })
        })
    }
}
