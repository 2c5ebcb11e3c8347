//! Sends a printable ramp on USART1 per press of the user button, written by
//! the CPU one byte per main-loop iteration.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use dp_feed::{
    app::App,
    board::{self, Board, HostSink},
    capture::Capture,
    config::{Pacing, Polarity},
    machine::{Button, Controller},
    packet,
    poller::PollFeed,
    sink::{Sink, BANNER},
    wait::Spin,
};
use stm32f3::stm32f303::interrupt;

#[interrupt]
fn TIM2() {
    board::on_sample_tick();
}

#[entry]
fn main() -> ! {
    board::init_logging();
    let board = Board::take().unwrap();

    let mut host = HostSink::default();
    host.start();
    host.put_str(BANNER);

    let packet = cortex_m::singleton!(: [u8; 128] = [0; 128]).unwrap();
    packet::ramp(packet);
    let packet: &'static [u8] = packet;

    let feeder = PollFeed::new(packet, Pacing::Incremental, Spin);
    let controller = Controller::new(
        board.uart,
        feeder,
        Button::new(board.button, Polarity::ActiveHigh),
    );
    let capture = Capture::new(&board::SAMPLE, board.probe, board.echo);

    App::new(controller, capture).run()
}
