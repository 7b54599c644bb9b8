use crate::database::review::ReviewRepository;
use crate::error::app_error::AppError;
use crate::models::review::ReviewRequest;
use tracing::info;

const SAMPLE_REVIEWS: [(&str, &str, &str); 3] = [
    (
        "Sarah Johnson",
        "sarah.j@example.com",
        "Sandras Cleaning transformed my home! Their attention to detail is amazing, and the team is always professional and punctual.",
    ),
    (
        "Michael Chen",
        "michael.chen@example.com",
        "We have been using Sandras Cleaning for our office for over a year. They consistently deliver excellent service!",
    ),
    (
        "Emily Rodriguez",
        "emily.r@example.com",
        "Outstanding service! Their deep cleaning service is worth every penny. Perfect for preparing properties for new tenants.",
    ),
];

pub fn sample_reviews() -> Vec<ReviewRequest> {
    SAMPLE_REVIEWS
        .iter()
        .map(|(name, email, review)| ReviewRequest {
            name: name.to_string(),
            email: email.to_string(),
            rating: 5,
            review: review.to_string(),
        })
        .collect()
}

/// Fills an empty review table with the approved sample reviews.
/// Returns how many were inserted; zero once any review exists.
pub async fn ensure_sample_reviews<R>(repository: &R) -> Result<usize, AppError>
where
    R: ReviewRepository + ?Sized,
{
    if repository.count_reviews().await? > 0 {
        return Ok(0);
    }

    let samples = sample_reviews();
    for sample in &samples {
        repository.create_approved_review(sample).await?;
    }

    info!(count = samples.len(), "sample reviews seeded");
    Ok(samples.len())
}
