//! Whole command lines against a fake device

use std::io;

use memapp::Error;

use crate::common::Device;

#[test]
fn read_word() {
    let dev = Device::new("read-word");
    dev.poke(0x2c, 0x92);

    assert_eq!(
        dev.run(&["memapp", "-r", "-a", "2c"]).unwrap(),
        "REG(0x0000002c): 0x00000092\n"
    );
    assert_eq!(
        dev.run(&["memapp", "-r", "-a", "2e", "-b", "0"]).unwrap(),
        "REG(0x0000002c): 0x00000092\t[0]=0\n"
    );
}

#[test]
fn set_bit_then_clear_it() {
    let dev = Device::new("bits");
    dev.poke(0x102c, 0x92);

    assert_eq!(
        dev.run(&["memapp", "-w", "-a", "102c", "-b", "0", "-d", "1"])
            .unwrap(),
        "REG(0x0000102c): 0x00000093\t[0]=1\n"
    );
    assert_eq!(dev.peek(0x102c), 0x93);

    assert_eq!(
        dev.run(&["memapp", "-w", "-a", "102c", "-b", "7", "-d", "0"])
            .unwrap(),
        "REG(0x0000102c): 0x00000013\t[7]=0\n"
    );
    assert_eq!(dev.peek(0x102c), 0x13);
}

#[test]
fn write_word() {
    let dev = Device::new("write-word");

    assert_eq!(
        dev.run(&["memapp", "-w", "-a", "0x40", "-d", "cafef00d"])
            .unwrap(),
        " REG(0x00000040): 0xcafef00d\n"
    );
    assert_eq!(dev.peek(0x40), 0xcafe_f00d);
    assert_eq!(dev.peek(0x44), 0);
}

#[test]
fn listing() {
    let dev = Device::new("listing");
    for (i, &word) in [0xea00_0014, 0xe59f_f014, 0xe59f_f014, 0xe59f_f014, 0x4142_4344]
        .iter()
        .enumerate()
    {
        dev.poke(0x2000 + 4 * i as u32, word);
    }

    assert_eq!(
        dev.run(&["memapp", "-r", "-a", "2000", "-l", "16"]).unwrap(),
        "00002000: ea00 0014 e59f f014 e59f f014 e59f f014    ................\n"
    );

    assert_eq!(
        dev.run(&["memapp", "-r", "-a", "2000", "-l", "17", "-s"])
            .unwrap(),
        "00002000: ea00 0014 e59f f014 e59f f014 e59f f014    ................\n\
         00002010: 4142 4344                                  ABCD\n"
    );

    assert_eq!(
        dev.run(&["memapp", "-r", "-e", "-a", "2010", "-l", "4"]).unwrap(),
        "00002010: 4443 4241                                  DCBA\n"
    );
}

#[test]
fn example_then_version() {
    let dev = Device::new("example");

    let out = dev.run(&["memapp", "-E", "-v"]).unwrap();

    assert!(out.starts_with(" Example:\n~ # memapp -r -a 1e78502c\n"));
    assert!(out.ends_with("................\nversion 1.2\n"));
}

#[test]
fn help_does_nothing_else() {
    let dev = Device::new("help");
    dev.poke(0, 0x1234_5678);

    for args in &[
        &["memapp"][..],
        &["memapp", "-h"],
        &["memapp", "-w", "-a", "0", "-?"],
        &["memapp", "-w", "-a", "0", "-q"],
    ] {
        let out = dev.run(args).unwrap();
        assert!(out.starts_with("**********************************************\n"));
        assert!(out.contains("Usage: memapp [OPTIONS...]\n"));
    }
    assert_eq!(dev.peek(0), 0x1234_5678);
}

#[test]
fn no_mode_is_a_no_op() {
    let dev = Device::new("no-mode");
    dev.poke(0, 0x1234_5678);

    assert_eq!(dev.run(&["memapp", "-a", "0", "-d", "ff"]).unwrap(), "");
    assert_eq!(dev.peek(0), 0x1234_5678);

    match dev.run(&["memapp", "-s", "-a", "0", "-d", "ff"]) {
        Err(Error::NoMode) => {}
        res => panic!("unexpected result: {:?}", res.map_err(|e| e.to_string())),
    }
}

#[test]
fn missing_device() {
    let dev = Device::new("missing");
    let path = dev.path().to_owned();
    drop(dev);

    let mut out: Vec<u8> = vec![];
    let inv = match memapp::cli::parse(vec!["memapp", "-r", "-a", "0"]).unwrap().action {
        memapp::cli::Action::Run(inv) => inv,
        action => panic!("unexpected action: {:?}", action),
    };

    let mut mem = memapp::devmem::PhysMem::new(&path, inv.policy.session());
    memapp::dispatch::execute(&inv, &mut mem, &mut out).unwrap();
    assert_eq!(out, b"open /dev/mem error!\n");

    let strict = memapp::cli::Invocation {
        policy: memapp::cli::Policy::Strict,
        ..inv
    };
    match memapp::dispatch::execute(&strict, &mut mem, &mut io::sink()) {
        Err(Error::Open { path: p, .. }) => assert_eq!(p, path.display().to_string()),
        res => panic!("unexpected result: {:?}", res.map_err(|e| e.to_string())),
    }
}
