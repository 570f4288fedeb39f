//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateEventRequest, CreateGuestTokenRequest, CreateShareLinkRequest, FinalizeMediaRequest,
    ReportFailureRequest, SubmitMediaRequest, SubmitMessageRequest, UpdateEventRequest,
    UpdateTokenExpirationRequest, ValidateTokenRequest,
};

pub use responses::{
    CleanupResponse, CreatedTokenResponse, EventResponse, GuestTokenResponse, HealthChecks,
    HealthResponse, MaintenanceReport, MediaFileResponse, MediaWithMessageResponse,
    MessageResponse, MessageSummary, ReadinessResponse, RejectMessageResponse, ShareLinkResponse,
    StoredFile, SweepOutcome, TokenValidationResponse, UploadResponse, UploadUrlResponse,
};
