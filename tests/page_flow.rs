//! End-to-end page object flows against the in-memory remote driver.

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use tracing_subscriber::EnvFilter;

use vom::testing::{MockCall, MockElement, MockRemote, solid_png};
use vom::{
    ActionInput, ActionKind, ActionSpec, ActionTable, DataKind, Driver, Error, NewView, Point,
    Rgb, Selector, View, ViewExt,
};

// ============================================================================
// Views
// ============================================================================

struct LoginView {
    driver: Driver,
    actions: ActionTable,
}

impl View for LoginView {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn actions(&self) -> &ActionTable {
        &self.actions
    }
}

impl NewView for LoginView {
    fn new(driver: Driver) -> Self {
        let actions = ActionTable::new()
            .declare("username", Selector::id("username"), ActionSpec::set_text())
            .declare("password", Selector::id("password"), ActionSpec::set_text())
            .declare(
                "submit",
                Selector::id("login_button"),
                ActionSpec::click().wait_seconds(5).returns_view::<HomeView>(),
            )
            .declare(
                "help",
                Selector::id("help"),
                ActionSpec::click().returns_view_named("HelpView"),
            );
        Self { driver, actions }
    }
}

struct HomeView {
    driver: Driver,
    actions: ActionTable,
}

impl View for HomeView {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn actions(&self) -> &ActionTable {
        &self.actions
    }
}

impl NewView for HomeView {
    fn new(driver: Driver) -> Self {
        let actions = ActionTable::new()
            .declare("title", Selector::id("title"), ActionSpec::get_text())
            .declare("rows", Selector::class_name("row"), ActionSpec::get_texts())
            .declare(
                "status_color",
                Selector::id("status"),
                ActionSpec::new(ActionKind::GetAverageColor).returns(DataKind::Color),
            )
            .declare(
                "logout",
                Selector::id("logout"),
                ActionSpec::click().returns_view_named("LoginView"),
            )
            .declare("reorder", Selector::id("row_handle"), ActionSpec::drag());
        Self { driver, actions }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn login_screen() -> MockRemote {
    let remote = MockRemote::new();
    remote.add(
        MockElement::new(Selector::id("username"))
            .at(20, 100)
            .size(300, 40)
            .focusable(),
    );
    remote.add(
        MockElement::new(Selector::id("password"))
            .at(20, 160)
            .size(300, 40)
            .focusable(),
    );
    remote.add(
        MockElement::new(Selector::id("login_button"))
            .at(20, 240)
            .size(300, 48)
            .text("Log in")
            .appears_after(Duration::from_secs(2)),
    );
    remote.add(MockElement::new(Selector::id("help")));
    remote
}

fn add_home_screen(remote: &MockRemote) {
    remote.add(MockElement::new(Selector::id("title")).text("Inbox"));
    remote.add(MockElement::new(Selector::class_name("row")).text("First"));
    remote.add(MockElement::new(Selector::class_name("row")).text("Second"));
    remote.add(
        MockElement::new(Selector::id("status"))
            .size(24, 24)
            .screenshot(solid_png(24, 24, Rgb::new(0, 200, 0))),
    );
    remote.add(MockElement::new(Selector::id("logout")));
    remote.add(MockElement::new(Selector::id("row_handle")).at(0, 300).size(40, 40));
}

fn driver_for(remote: &MockRemote) -> Driver {
    Driver::builder()
        .remote(remote.clone())
        .view::<LoginView>()
        .view::<HomeView>()
        .build()
        .unwrap()
}

// ============================================================================
// Flows
// ============================================================================

#[tokio::test(start_paused = true)]
async fn login_then_read_home() -> anyhow::Result<()> {
    init_tracing();
    let remote = login_screen();
    add_home_screen(&remote);
    let driver = driver_for(&remote);

    let login = driver.view::<LoginView>();
    login.perform("username", ActionInput::text("alice")).await?;
    login.perform("password", ActionInput::text("hunter2")).await?;
    let home: HomeView = login.perform_view("submit", ActionInput::None).await?;

    let title: String = home.perform_into("title", ActionInput::None).await?;
    let rows: Vec<String> = home.perform_into("rows", ActionInput::None).await?;
    let status: Rgb = home.perform_into("status_color", ActionInput::None).await?;

    assert_eq!(title, "Inbox");
    assert_eq!(rows, vec!["First", "Second"]);
    assert_eq!(status.to_string(), "0,200,0");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn late_login_button_is_clicked_once() -> anyhow::Result<()> {
    let remote = login_screen();
    let driver = driver_for(&remote);
    let started = tokio::time::Instant::now();

    let _home: HomeView = driver
        .view::<LoginView>()
        .perform_view("submit", ActionInput::None)
        .await?;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_millis(2250));
    assert_eq!(remote.clicks().len(), 1);
    assert!(remote.taps().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn typed_fields_are_defocused() -> anyhow::Result<()> {
    let remote = login_screen();
    let driver = driver_for(&remote);

    driver
        .view::<LoginView>()
        .perform("username", ActionInput::text("alice"))
        .await?;

    let field = driver.find_element(&Selector::id("username")).await?;
    assert_eq!(field.get_text().await?, "alice");
    assert!(!field.is_focused().await?);
    assert_eq!(remote.taps(), vec![Point::new(170, 99)]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_login_button_times_out() {
    let remote = MockRemote::new();
    let driver = driver_for(&remote);

    let result = driver
        .view::<LoginView>()
        .perform_view::<HomeView>("submit", ActionInput::None)
        .await;

    let Err(err) = result else {
        panic!("login button should not resolve");
    };
    assert!(matches!(
        err,
        Error::ElementNotFound { ref selector, elapsed_ms } if selector == "id:login_button" && elapsed_ms >= 5000
    ));
}

#[tokio::test(start_paused = true)]
async fn navigation_by_name() -> anyhow::Result<()> {
    let remote = login_screen();
    add_home_screen(&remote);
    let driver = driver_for(&remote);

    let home = driver.view::<HomeView>();
    let login: LoginView = home.perform_view("logout", ActionInput::None).await?;
    assert_eq!(login.view_name(), "LoginView");

    let missing = login.perform("help", ActionInput::None).await;
    let err = assert_err!(missing);
    assert!(matches!(err, Error::ConstructionFailure { ref view, .. } if view == "HelpView"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn wrong_view_type_is_rejected() {
    let remote = login_screen();
    add_home_screen(&remote);
    let driver = driver_for(&remote);

    let result = driver
        .view::<HomeView>()
        .perform_view::<HomeView>("logout", ActionInput::None)
        .await;

    let Err(err) = result else {
        panic!("logout should not produce a HomeView");
    };
    assert!(matches!(err, Error::ConstructionFailure { .. }));
}

#[tokio::test(start_paused = true)]
async fn drag_uses_default_duration() {
    let remote = login_screen();
    add_home_screen(&remote);
    let driver = driver_for(&remote);

    assert_ok!(
        driver
            .view::<HomeView>()
            .perform("reorder", ActionInput::drag_to(Point::new(20, 500)))
            .await
    );

    assert!(remote.calls().contains(&MockCall::SlideFinger(
        Point::new(20, 320),
        Point::new(20, 500),
        Duration::from_millis(100),
    )));
}

#[tokio::test(start_paused = true)]
async fn undeclared_action_is_invalid_argument() {
    let remote = login_screen();
    let driver = driver_for(&remote);

    let result = driver.view::<LoginView>().perform("forgot", ActionInput::None).await;
    assert!(matches!(assert_err!(result), Error::InvalidArgument { .. }));
}

#[tokio::test(start_paused = true)]
async fn selector_rewrite_prefixes_ids() -> anyhow::Result<()> {
    let remote = MockRemote::new();
    remote.add(MockElement::new(Selector::id("com.example:id/title")).text("Inbox"));
    let driver = Driver::builder()
        .remote(remote.clone())
        .on_selector_load(|selector: Selector| match selector {
            Selector::Id(id) => Selector::id(format!("com.example:id/{id}")),
            other => other,
        })
        .build()?;

    let title: String = driver
        .view::<HomeView>()
        .perform_into("title", ActionInput::None)
        .await?;
    assert_eq!(title, "Inbox");
    Ok(())
}
