// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (route guard, token verification, security headers).

pub mod auth;
pub mod guard;
pub mod security;

pub use guard::route_guard;
