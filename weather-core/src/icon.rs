//! Maps provider condition icon codes to the image assets bundled with the app.

pub const DEFAULT_ICON: &str = "cloud.png";

/// Image for an OpenWeather icon code such as `"10d"`. Unknown codes get [`DEFAULT_ICON`].
pub fn weather_icon(code: &str) -> &'static str {
    match code {
        "01d" => "sun.png",
        "01n" => "clear-sky.png",
        "02d" | "02n" => "few-clouds.png",
        "03d" | "03n" => "scattered-clouds.png",
        "04d" | "04n" => "broken-clouds.png",
        "09d" | "09n" => "shower-rain.png",
        "10d" | "10n" => "rain.png",
        "11d" | "11n" => "thunderstorm.png",
        "13d" | "13n" => "snow.png",
        "50d" | "50n" => "mist.png",
        _ => DEFAULT_ICON,
    }
}
