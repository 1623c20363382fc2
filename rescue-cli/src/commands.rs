//! Subcommand execution.

use std::io::Write;

use rescue_core::catalog::format_rupees;
use rescue_core::{
    Campaign, CampaignRepository, InjuryReportFlow, Listing, MockRescueApi, Notice, Pet,
    PetQuery, PetRepository, RescueConfig, RescueError, Shelter, ShelterDirectory, SubmissionReceipt,
};
use serde::Serialize;

use crate::devices::{self, FixedPosition, StillFileCamera};
use crate::{CliArgs, Command, ReportArgs};

/// Run the parsed command, writing results to `out`.
///
/// # Errors
///
/// Returns an error if a listing cannot be loaded, the report is incomplete
/// or rejected, or `out` cannot be written.
pub async fn run(args: &CliArgs, config: &RescueConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let api = MockRescueApi::from_config(config);
    match &args.command {
        Command::Pets {
            search,
            kind,
            featured,
        } => {
            let mut pets = api.search_pets(&PetQuery::new(search.as_str(), *kind)).await?;
            if let Some(limit) = featured {
                pets.truncate(*limit);
            }
            if args.json {
                write_json(out, &Listing::ok(pets))
            } else {
                render_pets(out, &pets)
            }
        }
        Command::Campaigns { featured } => {
            let campaigns = match featured {
                Some(limit) => api.featured_campaigns(*limit).await?,
                None => api.campaigns().await?,
            };
            if args.json {
                write_json(out, &Listing::ok(campaigns))
            } else {
                render_campaigns(out, &campaigns)
            }
        }
        Command::Shelters => {
            if args.json {
                write_json(out, &Listing::ok(api.shelters().to_vec()))
            } else {
                render_shelters(out, api.shelters())
            }
        }
        Command::Report(report) => {
            let receipt = file_report(config, api, report, out).await?;
            if args.json {
                write_json(out, &receipt)?;
            }
            Ok(())
        }
    }
}

/// Drive an injury report from capture to submission.
///
/// Notices raised along the way are written to `out`, like the toasts a
/// browser user would see.
///
/// # Errors
///
/// Returns an error if the photo cannot be used, a required field is missing,
/// or the backend rejects the report.
pub async fn file_report(
    config: &RescueConfig,
    api: MockRescueApi,
    args: &ReportArgs,
    out: &mut impl Write,
) -> anyhow::Result<SubmissionReceipt> {
    let positions = FixedPosition::new(args.lat, args.lon)?;
    let mut flow = InjuryReportFlow::new(
        config,
        StillFileCamera::new(&args.photo),
        positions,
        api,
    );

    if args.upload {
        flow.upload_image(devices::read_upload(&args.photo).await?);
    } else {
        let captured = match flow.open_camera().await {
            Ok(()) => flow.capture_photo().map(drop),
            Err(e) => Err(e),
        };
        if let Err(e) = captured {
            let error = RescueError::from(e);
            write_notice(out, &error.notice())?;
            flow.dispose();
            return Err(error.into());
        }
    }

    match flow.fetch_location().await {
        Ok(location) => tracing::info!(%location, "location shared"),
        Err(e) => tracing::warn!("location not shared: {e}"),
    }

    flow.set_description(args.description.as_str());
    flow.set_contact_name(args.name.as_str());
    flow.set_contact_phone(args.phone.as_str());

    let outcome = flow.submit().await.map_err(RescueError::from);
    match &outcome {
        Ok(_) => {
            if let Some(notice) = flow.view().notice {
                write_notice(out, &notice)?;
            }
        }
        Err(e) => write_notice(out, &e.notice())?,
    }
    flow.dispose();

    let receipt = outcome?;
    writeln!(
        out,
        "Report {} sent to {} shelters",
        receipt.report_id, receipt.shelters_notified
    )?;
    Ok(receipt)
}

fn write_notice(out: &mut impl Write, notice: &Notice) -> anyhow::Result<()> {
    writeln!(out, "{}: {}", notice.title, notice.description)?;
    Ok(())
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn render_pets(out: &mut impl Write, pets: &[Pet]) -> anyhow::Result<()> {
    if pets.is_empty() {
        writeln!(out, "No pets found matching your criteria")?;
    }
    for pet in pets {
        writeln!(out, "{} ({}, {})", pet.name, pet.breed, pet.age)?;
        writeln!(out, "  at {}", pet.location)?;
        writeln!(out, "  {}", pet.description)?;
    }
    Ok(())
}

fn render_campaigns(out: &mut impl Write, campaigns: &[Campaign]) -> anyhow::Result<()> {
    for campaign in campaigns {
        writeln!(out, "{}", campaign.title)?;
        writeln!(
            out,
            "  {} raised of {} - {} - {}",
            format_rupees(campaign.raised_amount),
            format_rupees(campaign.target_amount),
            campaign.funded_label(),
            campaign.days_left_label()
        )?;
        writeln!(out, "  {}", campaign.description)?;
    }
    Ok(())
}

fn render_shelters(out: &mut impl Write, shelters: &[Shelter]) -> anyhow::Result<()> {
    for shelter in shelters {
        writeln!(out, "{}", shelter.name)?;
        writeln!(out, "  {}", shelter.address)?;
        writeln!(out, "  {} | {}", shelter.phone, shelter.email)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use rescue_core::{ApiConfig, VideoFrame};

    use super::*;

    fn instant_config() -> RescueConfig {
        RescueConfig {
            api: ApiConfig::instant(),
            ..RescueConfig::default()
        }
    }

    async fn run_to_string(argv: &[&str]) -> anyhow::Result<String> {
        let args = CliArgs::try_parse_from(std::iter::once("paw-rescue").chain(argv.iter().copied()))?;
        let mut out = Vec::new();
        run(&args, &instant_config(), &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    fn photo(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("stray.jpg");
        let jpeg = VideoFrame::solid(16, 12, [180, 140, 90, 255])
            .encode_jpeg(90)
            .unwrap()
            .decode()
            .unwrap();
        std::fs::write(&path, jpeg).unwrap();
        path
    }

    fn report_args(photo: PathBuf) -> ReportArgs {
        ReportArgs {
            photo,
            upload: false,
            lat: Some(17.6868),
            lon: Some(83.2185),
            phone: "9876543210".into(),
            name: String::new(),
            description: "Puppy with a hurt paw".into(),
            fail: false,
        }
    }

    #[tokio::test]
    async fn pets_text_listing() {
        let text = run_to_string(&["pets", "--kind", "dog", "--featured", "2"]).await.unwrap();
        assert!(text.contains("Buddy (Labrador Mix, 2 years)"));
        assert!(text.contains("Max (German Shepherd, 3 years)"));
        assert!(!text.contains("Daisy"));
    }

    #[tokio::test]
    async fn pets_empty_result_message() {
        let text = run_to_string(&["pets", "--search", "hamster"]).await.unwrap();
        assert_eq!(text.trim(), "No pets found matching your criteria");
    }

    #[tokio::test]
    async fn campaigns_json_envelope() {
        let text = run_to_string(&["--json", "campaigns"]).await.unwrap();
        let listing: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(listing["success"], true);
        assert_eq!(listing["data"][0]["dayLeft"], 12);
    }

    #[tokio::test]
    async fn campaigns_text_shows_progress() {
        let text = run_to_string(&["campaigns", "--featured", "1"]).await.unwrap();
        assert!(text.contains("₹32,450 raised of ₹50,000 - 65% Funded - 12 days left"));
    }

    #[tokio::test]
    async fn shelters_listing() {
        let text = run_to_string(&["shelters"]).await.unwrap();
        assert!(text.contains("Helping Paws Shelter"));
        assert!(text.contains("+91 9876543212 | rescue@arr.org"));
    }

    #[tokio::test]
    async fn report_through_camera_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = photo(&dir);
        let config = instant_config();
        let mut out = Vec::new();
        let receipt = file_report(
            &config,
            MockRescueApi::from_config(&config),
            &report_args(path),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(receipt.shelters_notified, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Report submitted successfully: "));
        assert!(text.contains("sent to 3 shelters"));
    }

    #[tokio::test]
    async fn report_upload_without_location_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = photo(&dir);
        let config = instant_config();
        let mut args = report_args(path);
        args.upload = true;
        args.lat = None;
        args.lon = None;

        let mut out = Vec::new();
        let err = file_report(&config, MockRescueApi::from_config(&config), &args, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RescueError>(),
            Some(RescueError::ValidationFailed(_))
        ));
        assert!(String::from_utf8(out).unwrap().starts_with("Location required: "));
    }

    #[tokio::test]
    async fn rejected_report_prints_failure_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = photo(&dir);
        let config = RescueConfig {
            api: ApiConfig {
                fail_reports: true,
                ..ApiConfig::instant()
            },
            ..RescueConfig::default()
        };
        let mut out = Vec::new();
        let result = file_report(
            &config,
            MockRescueApi::from_config(&config),
            &report_args(path),
            &mut out,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            String::from_utf8(out).unwrap().trim(),
            "Error submitting report: Please try again later"
        );
    }

    #[tokio::test]
    async fn missing_photo_prints_camera_notice() {
        let dir = tempfile::tempdir().unwrap();
        let config = instant_config();
        let mut out = Vec::new();
        let err = file_report(
            &config,
            MockRescueApi::from_config(&config),
            &report_args(dir.path().join("absent.jpg")),
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RescueError>(),
            Some(RescueError::Camera(_))
        ));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Camera unavailable: "));
        assert!(text.contains("try uploading an image instead"));
    }
}
