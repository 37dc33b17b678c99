mod app;
mod theme;
mod views;
mod widgets;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("MoodSnap")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(720.0, 680.0),
            ..Default::default()
        })
        .run()
}
