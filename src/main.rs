use std::process;

use docdesk::{
    application::{
        bulk::{BulkAction, BulkRequest, BulkTarget, CsrfToken},
        error::AppError,
        query::ListQuery,
        repos::{ListingSource, load_controller},
        selection::SelectionSet,
        sort::SortField,
        toast::ToastCenter,
    },
    config::{self, BulkArgs, FetchArgs, ListArgs, OutputFormat, Settings, ViewArgs},
    domain::types::RecordId,
    infra::{
        files::JsonFileSource,
        http::{AdminClient, HttpListingSource},
        telemetry,
    },
    presentation::{
        admin::views::{AdminBulkFormTemplate, AdminListingTemplate, AdminToastStackTemplate},
        text::render_table,
        views::render_template,
    },
};
use serde_json::json;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let toast = error.toast();
    eprintln!("{}", toast.text);

    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::List(args) => run_list(settings, args).await,
        config::Command::Fetch(args) => run_fetch(settings, args).await,
        config::Command::Bulk(args) => run_bulk(settings, args).await,
    }
}

async fn run_list(settings: Settings, args: ListArgs) -> Result<(), AppError> {
    let source = JsonFileSource::new(args.input);
    render_listing(&settings, &source, &args.view).await
}

async fn run_fetch(settings: Settings, args: FetchArgs) -> Result<(), AppError> {
    let client = AdminClient::new(&settings)?;
    let source = HttpListingSource::new(client.clone(), args.path, settings.listing.page_size);

    match render_listing(&settings, &source, &args.view).await {
        Err(AppError::Http(failure)) => {
            if let Some(update) = client.login_redirect(&failure) {
                let login = client
                    .url(&update.href(client.login_path()))
                    .map_or_else(|_| update.href(client.login_path()), |url| url.to_string());
                eprintln!("{}: {login}", failure.user_message());
            }
            Err(AppError::Http(failure))
        }
        other => other,
    }
}

async fn render_listing(
    settings: &Settings,
    source: &dyn ListingSource,
    view: &ViewArgs,
) -> Result<(), AppError> {
    let mut query = ListQuery::parse(&view.query);
    if let Some(size) = query.page_size
        && !settings.listing.is_allowed_page_size(size)
    {
        warn!(page_size = size, "ignoring page size the listing does not offer");
        query.page_size = None;
    }

    let mut controller = load_controller(source, settings.listing.list_options(None), query).await?;
    for raw in &view.sort {
        match SortField::parse(raw) {
            Some(field) => {
                controller.sort_by(field);
            }
            None => warn!(field = %raw, "ignoring unknown sort column"),
        }
    }

    let list_view = controller.view();
    let rendered = match view.format {
        OutputFormat::Table => render_table(&list_view),
        OutputFormat::Json => {
            let body = json!({
                "query": controller.query().encode(),
                "showing": list_view.showing,
                "totalPages": list_view.total_pages,
                "rows": list_view.rows,
                "summary": list_view.summary,
            });
            serde_json::to_string_pretty(&body)
                .map_err(|err| AppError::unexpected(err.to_string()))?
        }
        OutputFormat::Html => render_template(&AdminListingTemplate::from_view(&list_view))
            .map_err(|err| AppError::unexpected(err.report().chain()))?,
    };

    info!(query = %controller.query().encode(), "listing rendered");
    println!("{rendered}");
    Ok(())
}

async fn run_bulk(settings: Settings, args: BulkArgs) -> Result<(), AppError> {
    let target = BulkTarget::parse(&args.target)
        .ok_or_else(|| AppError::unexpected(format!("unknown bulk target `{}`", args.target)))?;
    let action = args
        .action
        .as_deref()
        .map(|raw| {
            BulkAction::parse(raw)
                .ok_or_else(|| AppError::unexpected(format!("unknown bulk action `{raw}`")))
        })
        .transpose()?;

    let mut selection = SelectionSet::new();
    for id in args.ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        selection.insert(RecordId::from(id));
    }

    let client = AdminClient::new(&settings)?;
    let csrf = match (&args.csrf, &args.csrf_page) {
        (Some(value), _) => Some(CsrfToken::new(settings.csrf.param.clone(), value.clone())),
        (None, Some(page)) => client.fetch_page_markers(page).await?.csrf,
        (None, None) => None,
    };

    if args.per_item {
        let outcome = client
            .delete_many(target, selection.ids(), args.reason.as_deref(), csrf.as_ref())
            .await?;
        let center = ToastCenter::new(settings.toast);
        for toast in outcome.toasts() {
            center.show(toast);
        }
        return print_toasts(&center);
    }

    let form = BulkRequest::new(target, &selection)
        .csrf(csrf.as_ref())
        .action(action)
        .reason(args.reason.as_deref())
        .build()?;

    if !args.submit {
        let markup = render_template(&AdminBulkFormTemplate::from(&form))
            .map_err(|err| AppError::unexpected(err.report().chain()))?;
        println!("{markup}");
        return Ok(());
    }

    let outcome = client.submit(&form).await?;
    info!(landed_on = %outcome.landed_on, "bulk form submitted");
    let center = ToastCenter::new(settings.toast);
    center.show_flashes(outcome.markers.flashes);
    print_toasts(&center)
}

fn print_toasts(center: &ToastCenter) -> Result<(), AppError> {
    let markup = render_template(&AdminToastStackTemplate::from_center(center))
        .map_err(|err| AppError::unexpected(err.report().chain()))?;
    println!("{markup}");
    Ok(())
}
