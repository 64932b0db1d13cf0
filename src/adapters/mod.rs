//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC1 (two NTCs)       |
//! |            | ActuatorPort       | Relay GPIOs, buzzer         |
//! | `log_sink` | EventSink          | Serial log output           |
//! |            | DisplayPort        | Serial log output           |
//! | `sim`      | SensorPort         | Simulated thermal plant     |
//! |            | ActuatorPort       |                             |
//! | `time`     | -                  | ESP32 system timer / host   |

pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
