//! Sends one DMA-fed packet on USART1 per press of the user button, while
//! echoing GPIOB samples on USART2.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use dp_feed::{
    app::App,
    board::{self, Board, HostSink},
    capture::Capture,
    config::Polarity,
    dma::{BurstEngine, DescriptorArena},
    machine::{Button, Controller},
    packet,
    sink::{Sink, BANNER},
    target::Peripheral,
};
use stm32f3::stm32f303::interrupt;

const PHRASE: &[u8] = b"The quick brown fox jumps over the lazy dog. ";

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
    packet::tile(PHRASE, packet);
    let packet: &'static [u8] = packet;

    let mut arena: DescriptorArena = DescriptorArena::new();
    let mut engine = BurstEngine::new(board.dma, &mut arena).unwrap();
    engine
        .configure(packet, board.uart.input_address())
        .unwrap();

    let controller = Controller::new(
        board.uart,
        engine,
        Button::new(board.button, Polarity::ActiveHigh),
    );
    let capture = Capture::new(&board::SAMPLE, board.probe, board.echo);

    App::new(controller, capture).run()
}
