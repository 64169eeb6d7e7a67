// Operator reference printed by the help command

pub const HELP_TEXT: &str = "\
Commands:
alloc data|code length          Allocate device memory into the next free $N.
free addr                       Free the variable at addr ($N or its address).
read addr [length] [file]       Dump memory, or save it to file. Length
                                defaults to the variable's size.
write addr [length] file        Write a file's bytes to addr. Code memory is
                                used when addr is a code variable.
writecode addr [length] file    Like write, but always uses code memory and
                                marks a $N target as code.
set addr value                  Write a 32-bit little-endian value at addr.
                                value may be any address expression.
get addr name                   Read a 32-bit little-endian value from addr
                                into %name and %#.
local addr name                 Store the resolved addr in %name.
exec addr [arg0] ... [arg3]     Run code at addr; the return value goes to %#.
vars                            List variables, locals and the last result.
echo [text]                     Send text to the device and print its reply.
script file                     Run every command in file.
quit                            Leave the console.

Parameters:
addr    A number (0x81000000, 4096), a variable $N, a local %name, or %# for
        the last result, optionally followed by +num or -num
        (ex: $2+0x100, $0-256, %buf+4). Arithmetic wraps at 32 bits.
length  A number (0x1000, 256) or a type: char, uchar, bool, short, ushort,
        int, uint, long, ulong, float, double, ptr. int and uint take a bit
        width of 8, 16, 32 or 64 (ex: int32, uint16).
name    A local name made of letters, digits and '_' (ex: buf, ret_1).
file    Path relative to the working directory, or absolute.
";
